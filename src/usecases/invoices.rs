use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::domain::{
    entities::invoices::InsertInvoiceEntity,
    repositories::invoices::InvoiceRepository,
    value_objects::{
        enums::invoice_statuses::InvoiceStatus,
        invoices::{CreateInvoiceModel, CreateInvoiceReceipt, InvoiceDto},
        references,
    },
};
use crate::usecases::payment_error::{PaymentError, PaymentResult};

const MAX_TITLE_CHARS: usize = 50;
const MAX_DESC_CHARS: usize = 250;

pub struct InvoiceUseCase<I>
where
    I: InvoiceRepository + Send + Sync + 'static,
{
    invoice_repository: Arc<I>,
}

impl<I> InvoiceUseCase<I>
where
    I: InvoiceRepository + Send + Sync + 'static,
{
    pub fn new(invoice_repository: Arc<I>) -> Self {
        Self { invoice_repository }
    }

    pub async fn create_invoice(
        &self,
        active_user: &AuthUser,
        payload: CreateInvoiceModel,
    ) -> PaymentResult<CreateInvoiceReceipt> {
        if !active_user.role.is_privileged() {
            warn!(
                user_id = %active_user.user_id,
                role = %active_user.role,
                "invoices: user role may not create invoices"
            );
            return Err(PaymentError::Unauthorized);
        }

        check_payload(&payload)?;

        let inv_id = references::new_invoice_id();
        self.invoice_repository
            .create(InsertInvoiceEntity {
                inv_id: inv_id.clone(),
                title: payload.title,
                description: payload.desc,
                price: payload.price,
                recipient_email: payload.to_email,
                due_date: payload.due_date,
                status: InvoiceStatus::Pending.as_str().to_string(),
                paid: false,
                created_at: Utc::now(),
                created_by: active_user.name.clone(),
            })
            .await
            .map_err(PaymentError::Internal)?;

        info!(inv_id, created_by = %active_user.name, "invoices: invoice created");

        Ok(CreateInvoiceReceipt {
            msg: "Invoice created".to_string(),
            invoice_id: inv_id,
        })
    }

    pub async fn list_invoices(&self, active_user: &AuthUser) -> PaymentResult<Vec<InvoiceDto>> {
        let records = if active_user.role.is_privileged() {
            self.invoice_repository.list_all().await
        } else {
            self.invoice_repository
                .list_by_recipient(&active_user.email)
                .await
        }
        .map_err(PaymentError::Internal)?;

        Ok(records.into_iter().map(InvoiceDto::from).collect())
    }
}

fn check_payload(payload: &CreateInvoiceModel) -> PaymentResult<()> {
    if payload.title.chars().count() > MAX_TITLE_CHARS {
        return Err(PaymentError::Validation(
            "number of characters in 'title' greater than 50".to_string(),
        ));
    }

    if payload.desc.chars().count() > MAX_DESC_CHARS {
        return Err(PaymentError::Validation(
            "number of characters in 'desc' greater than 250".to_string(),
        ));
    }

    if payload.price.normalize().scale() > 2 {
        return Err(PaymentError::Validation(
            "price can carry at most 2 decimal digits".to_string(),
        ));
    }

    Ok(())
}
