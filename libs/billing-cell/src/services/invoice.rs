use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::{Filter, SelectOptions, SupabaseClient};
use shared_forms::Choice;

use crate::models::{Invoice, InvoiceError, InvoiceListQuery, ValidatedInvoice};

const LIST_EXPAND: &str = "*, patients(name)";

pub struct InvoiceService {
    supabase: SupabaseClient,
}

impl InvoiceService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Filtered listing, newest invoice date first. Blank filter values
    /// are skipped.
    pub async fn list(&self, query: &InvoiceListQuery) -> Result<Vec<Value>, InvoiceError> {
        let mut filters = Vec::new();
        if !query.status.is_empty() {
            filters.push(Filter::eq("status", &query.status));
        }
        if !query.start_date.is_empty() {
            filters.push(Filter::gte("invoice_date", &query.start_date));
        }
        if !query.end_date.is_empty() {
            filters.push(Filter::lte("invoice_date", &query.end_date));
        }

        let rows = self
            .supabase
            .select(
                "invoices",
                &filters,
                SelectOptions::new()
                    .expand(LIST_EXPAND)
                    .order_desc("invoice_date"),
            )
            .await?;
        Ok(rows)
    }

    /// Patient dropdown, alphabetical.
    pub async fn patient_choices(&self) -> Result<Vec<Choice>, InvoiceError> {
        let rows = self
            .supabase
            .select(
                "patients",
                &[],
                SelectOptions::new().expand("id, name").order_asc("name"),
            )
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                Some(Choice::new(
                    row.get("id")?.as_str()?,
                    row.get("name")?.as_str()?,
                ))
            })
            .collect())
    }

    pub async fn create(
        &self,
        invoice: ValidatedInvoice,
        created_by: &str,
    ) -> Result<Value, InvoiceError> {
        debug!("creating invoice for patient {}", invoice.patient_id);
        let row = json!({
            "patient_id": invoice.patient_id,
            "invoice_date": invoice.invoice_date.format("%Y-%m-%d").to_string(),
            "due_date": invoice.due_date.format("%Y-%m-%d").to_string(),
            "amount": invoice.amount,
            "status": invoice.status,
            "notes": invoice.notes,
            "created_by": created_by,
            "created_at": Utc::now().to_rfc3339(),
        });
        let created = self.supabase.insert("invoices", row).await?;
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<Value, InvoiceError> {
        self.supabase
            .find_by_id("invoices", id, Some(LIST_EXPAND))
            .await?
            .ok_or(InvoiceError::NotFound)
    }

    pub async fn get_typed(&self, id: &str) -> Result<Invoice, InvoiceError> {
        let row = self
            .supabase
            .find_by_id("invoices", id, None)
            .await?
            .ok_or(InvoiceError::NotFound)?;
        serde_json::from_value(row).map_err(|e| InvoiceError::Database(e.to_string()))
    }

    pub async fn update(&self, id: &str, invoice: ValidatedInvoice) -> Result<(), InvoiceError> {
        debug!("updating invoice {}", id);
        let patch = json!({
            "patient_id": invoice.patient_id,
            "invoice_date": invoice.invoice_date.format("%Y-%m-%d").to_string(),
            "due_date": invoice.due_date.format("%Y-%m-%d").to_string(),
            "amount": invoice.amount,
            "status": invoice.status,
            "notes": invoice.notes,
            "updated_at": Utc::now().to_rfc3339(),
        });
        self.supabase.update("invoices", id, patch).await?;
        Ok(())
    }
}
