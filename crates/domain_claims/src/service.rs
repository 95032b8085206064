//! Claims application service
//!
//! Orchestrates validation, client get-or-create, duplicate checks and the
//! store write. Handlers and the import/backup paths all go through here.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use core_kernel::{Clock, ClientId, PortError, ShipmentId};

use crate::analytics::{self, AnalyticsReport};
use crate::claim::{Claim, ClaimForm, ClaimRecord};
use crate::client::{normalize_client_name, Client, ClientSuggestion};
use crate::error::ClaimError;
use crate::filter::ClaimFilter;
use crate::import::{self, FailedRow, ImportReport, SheetCell, SkippedRow};
use crate::maintainer::DerivedFieldMaintainer;
use crate::ports::ClaimStore;
use crate::validation::{ClaimRules, ClaimValidator};

/// A claim created from a form
#[derive(Debug, Clone)]
pub struct CreatedClaim {
    pub record: ClaimRecord,
    /// Whether the client was created for this claim
    pub client_created: bool,
}

/// Outcome of deleting a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDeletion {
    pub client: Client,
    pub claims_removed: u64,
}

/// Entry point for claim and client operations
#[derive(Clone)]
pub struct ClaimService {
    store: Arc<dyn ClaimStore>,
    clock: Arc<dyn Clock>,
    rules: ClaimRules,
    maintainer: DerivedFieldMaintainer,
}

impl ClaimService {
    pub fn new(store: Arc<dyn ClaimStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            rules: ClaimRules::default(),
            maintainer: DerivedFieldMaintainer::default(),
        }
    }

    pub fn with_rules(mut self, rules: ClaimRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_maintainer(mut self, maintainer: DerivedFieldMaintainer) -> Self {
        self.maintainer = maintainer;
        self
    }

    pub fn store(&self) -> &Arc<dyn ClaimStore> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // ------------------------------------------------------------------
    // Clients
    // ------------------------------------------------------------------

    pub async fn list_clients(&self) -> Result<Vec<Client>, ClaimError> {
        Ok(self.store.list_clients().await?)
    }

    pub async fn get_client(&self, id: ClientId) -> Result<Client, ClaimError> {
        self.store
            .get_client(id)
            .await?
            .ok_or_else(|| ClaimError::ClientNotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create_client(&self, name: &str) -> Result<Client, ClaimError> {
        ClaimValidator::validate_client_name(name).into_result()?;
        let client = self.store.create_client(name.trim()).await?;
        info!(client_id = %client.client_id, "Client created");
        Ok(client)
    }

    #[instrument(skip(self))]
    pub async fn rename_client(&self, id: ClientId, name: &str) -> Result<Client, ClaimError> {
        ClaimValidator::validate_client_name(name).into_result()?;
        self.store
            .rename_client(id, name.trim())
            .await?
            .ok_or_else(|| ClaimError::ClientNotFound(id.to_string()))
    }

    /// Deletes a client and, when `confirmed`, its claims
    ///
    /// A client with claims is only removed after confirmation.
    #[instrument(skip(self))]
    pub async fn delete_client(&self, id: ClientId, confirmed: bool) -> Result<ClientDeletion, ClaimError> {
        let client = self.get_client(id).await?;
        let claims = self.store.count_claims_for_client(id).await?;
        if claims > 0 && !confirmed {
            return Err(ClaimError::ConfirmationRequired {
                client: client.name,
                claims,
            });
        }
        let claims_removed = self
            .store
            .delete_client(id)
            .await?
            .ok_or_else(|| ClaimError::ClientNotFound(id.to_string()))?;
        info!(client_id = %client.client_id, claims_removed, "Client deleted");
        Ok(ClientDeletion {
            client,
            claims_removed,
        })
    }

    pub async fn autocomplete(&self, term: &str) -> Result<Vec<ClientSuggestion>, ClaimError> {
        let clients = self.store.search_clients(term.trim()).await?;
        Ok(clients.iter().map(ClientSuggestion::from).collect())
    }

    // ------------------------------------------------------------------
    // Claims
    // ------------------------------------------------------------------

    pub async fn list_claims(&self, filter: &ClaimFilter) -> Result<Vec<ClaimRecord>, ClaimError> {
        Ok(self.store.list_claims(filter).await?)
    }

    pub async fn get_claim(&self, id: ShipmentId) -> Result<ClaimRecord, ClaimError> {
        self.store
            .get_claim(id)
            .await?
            .ok_or_else(|| ClaimError::ClaimNotFound(id.to_string()))
    }

    async fn ensure_unique_claim_no(&self, claim_no: &str, own: Option<ShipmentId>) -> Result<(), ClaimError> {
        match self.store.find_claim_by_number(claim_no).await? {
            Some(existing) if Some(existing.id) != own => Err(ClaimError::DuplicateClaimNo {
                claim_no: claim_no.to_string(),
                existing: existing.id,
            }),
            _ => Ok(()),
        }
    }

    async fn save(&self, claim: Claim) -> Result<ClaimRecord, ClaimError> {
        let claim_no = claim.claim_no.clone();
        match self.store.save_claim(claim, &self.maintainer, self.clock.today()).await {
            Ok(record) => Ok(record),
            // Lost a race with another writer of the same number
            Err(PortError::Conflict { message }) => match self.store.find_claim_by_number(&claim_no).await? {
                Some(existing) => Err(ClaimError::DuplicateClaimNo {
                    claim_no,
                    existing: existing.id,
                }),
                None => Err(PortError::conflict(message).into()),
            },
            Err(other) => Err(other.into()),
        }
    }

    /// Creates a claim from a form, creating its client when needed
    #[instrument(skip(self, form), fields(claim_no = %form.claim_no))]
    pub async fn create_claim(&self, form: ClaimForm) -> Result<CreatedClaim, ClaimError> {
        let claim_no = form.claim_no.trim().to_string();
        ClaimValidator::validate_form(&form, &self.rules).into_result()?;
        self.ensure_unique_claim_no(&claim_no, None).await?;

        let (client, client_created) = self.store.get_or_create_client(form.client_name.trim()).await?;
        if client_created {
            info!(client_id = %client.client_id, name = %client.name, "New client created for claim");
        }

        let mut claim = Claim::new(claim_no, client.id, self.clock.now());
        form.apply_to(&mut claim);
        let record = self.save(claim).await?;
        info!(
            claim_id = ?record.claim.claim_id.map(|c| c.to_string()),
            "Claim created"
        );
        Ok(CreatedClaim {
            record,
            client_created,
        })
    }

    /// Edits a claim; generated identifiers are kept
    #[instrument(skip(self, form))]
    pub async fn update_claim(&self, id: ShipmentId, form: ClaimForm) -> Result<ClaimRecord, ClaimError> {
        let mut claim = self.get_claim(id).await?.claim;
        ClaimValidator::validate_form(&form, &self.rules).into_result()?;
        self.ensure_unique_claim_no(form.claim_no.trim(), Some(id)).await?;

        let (client, _) = self.store.get_or_create_client(form.client_name.trim()).await?;
        claim.client_id = client.id;
        form.apply_to(&mut claim);
        claim.touch(self.clock.now());
        self.save(claim).await
    }

    pub async fn delete_claim(&self, id: ShipmentId) -> Result<(), ClaimError> {
        if self.store.delete_claim(id).await? {
            info!(%id, "Claim deleted");
            Ok(())
        } else {
            Err(ClaimError::ClaimNotFound(id.to_string()))
        }
    }

    /// Removes every claim, returning the count
    pub async fn clear_claims(&self) -> Result<u64, ClaimError> {
        let removed = self.store.clear_claims().await?;
        warn!(removed, "All claims cleared");
        Ok(removed)
    }

    pub async fn count_claims(&self) -> Result<u64, ClaimError> {
        Ok(self.store.count_claims().await?)
    }

    // ------------------------------------------------------------------
    // Analytics and import
    // ------------------------------------------------------------------

    pub async fn analytics(&self) -> Result<AnalyticsReport, ClaimError> {
        let records = self.store.list_claims(&ClaimFilter::default()).await?;
        let total_clients = self.store.count_clients().await?;
        Ok(analytics::compute(&records, total_clients, self.clock.today()))
    }

    /// Imports data rows, the header already removed
    ///
    /// Rows are handled one at a time and each write stands alone; a failing
    /// row is reported and the rest continue.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn import_rows(&self, rows: Vec<Vec<SheetCell>>) -> ImportReport {
        let mut report = ImportReport::default();

        for (index, cells) in rows.into_iter().enumerate() {
            let row = index + 2;
            if import::is_blank_row(&cells) {
                continue;
            }

            let claim_no = import::claim_number(&cells);
            if let Some(claim_no) = &claim_no {
                match self.store.find_claim_by_number(claim_no).await {
                    Ok(Some(_)) => {
                        report.skipped.push(SkippedRow {
                            row,
                            claim_no: claim_no.clone(),
                        });
                        continue;
                    }
                    Ok(None) => {}
                    Err(error) => {
                        report.errors.push(FailedRow {
                            row,
                            claim_no: Some(claim_no.clone()),
                            message: error.to_string(),
                        });
                        continue;
                    }
                }
            }

            match self.import_row(&cells).await {
                Ok(created) => report.created.push(created),
                Err(error) => {
                    warn!(row, error = %error, "Import row failed");
                    report.errors.push(FailedRow {
                        row,
                        claim_no,
                        message: error.to_string(),
                    });
                }
            }
        }

        info!(
            created = report.created_count(),
            skipped = report.skipped_count(),
            errors = report.error_count(),
            "Import finished"
        );
        report
    }

    async fn import_row(&self, cells: &[SheetCell]) -> Result<String, ClaimError> {
        let parsed = import::parse_row(cells)?;
        let name = normalize_client_name(&parsed.claimant)
            .ok_or_else(|| ClaimError::invalid("claimant", "Missing claimant name"))?;
        let (client, _) = self.store.get_or_create_client(&name).await?;
        let claim = parsed.into_claim(client.id, self.clock.now());
        let record = self.save(claim).await?;
        Ok(record.claim.claim_no)
    }
}
