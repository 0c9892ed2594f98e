//! Demo seeder for the Bahi posting core.
//!
//! Opens a chart of accounts in an in-memory store, stocks one item, runs a
//! bill, two invoices, a cancellation and a partial receipt through the
//! posting service, then prints the trial balance.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use bahi_core::clock::{Clock, SystemClock};
use bahi_core::document::{
    Document, DocumentKind, DocumentStatus, LineItem, NewDocument, StockLine,
};
use bahi_core::inventory::{NewInventoryItem, StockDirection, ValuationMethod};
use bahi_core::ledger::{AccountNature, Balance, NewLedgerAccount};
use bahi_core::posting::PostingService;
use bahi_db::{MemoryStore, StaticPartyDirectory};
use bahi_shared::AppConfig;
use bahi_shared::types::{DocumentId, ItemId, OrganizationId, PartyId, Quantity, WarehouseId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Service = PostingService<MemoryStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bahi=debug,seeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    info!(home = %config.tax.home_jurisdiction, "Configuration loaded");

    let customer = PartyId::new();
    let remote_customer = PartyId::new();
    let vendor = PartyId::new();
    let parties = StaticPartyDirectory::new()
        .with_party(customer, &config.tax.home_jurisdiction)
        .with_party(remote_customer, "EXPORT")
        .with_party(vendor, &config.tax.home_jurisdiction);

    let service = PostingService::new(MemoryStore::new(), Arc::new(parties), &config);
    let org = OrganizationId::new();
    let today = SystemClock.today();

    seed_chart(&service, org, &config).await?;

    let warehouse = WarehouseId::new();
    let widget = service
        .register_item(NewInventoryItem {
            organization_id: org,
            sku: "WIDGET".to_string(),
            name: "Widget".to_string(),
            valuation_method: ValuationMethod::Fifo,
        })
        .await?
        .id;

    let mut documents = Numbering::default();

    let bill = documents
        .draft(
            &service,
            org,
            DocumentKind::Bill,
            vendor,
            today,
            vec![goods(widget, warehouse, 100, dec!(40), StockDirection::In, dec!(18))],
            None,
        )
        .await?;
    approve(&service, bill.id).await?;

    let invoice = documents
        .draft(
            &service,
            org,
            DocumentKind::Invoice,
            customer,
            today,
            vec![goods(widget, warehouse, 30, dec!(75), StockDirection::Out, dec!(18))],
            None,
        )
        .await?;
    approve(&service, invoice.id).await?;

    let export = documents
        .draft(
            &service,
            org,
            DocumentKind::Invoice,
            remote_customer,
            today,
            vec![goods(widget, warehouse, 10, dec!(75), StockDirection::Out, dec!(18))],
            None,
        )
        .await?;
    approve(&service, export.id).await?;
    service
        .post_document_transition(export.id, DocumentStatus::Approved, DocumentStatus::Cancelled)
        .await?;

    let receipt = documents
        .draft(
            &service,
            org,
            DocumentKind::Receipt,
            customer,
            today,
            vec![LineItem::service("Advance", Quantity::units(1), dec!(1000), None)],
            Some(invoice.id),
        )
        .await?;
    approve(&service, receipt.id).await?;

    let valuation = service.get_item_valuation(widget, warehouse).await?;
    println!(
        "WIDGET on hand: {} units valued at {}",
        valuation.quantity, valuation.total_value
    );

    let trial = service.trial_balance(org).await?;
    println!("{:<6} {:<28} {:>12} {:>12}", "Code", "Account", "Debit", "Credit");
    for row in &trial.rows {
        println!(
            "{:<6} {:<28} {:>12} {:>12}",
            row.code, row.name, row.debit, row.credit
        );
    }
    println!(
        "{:<35} {:>12} {:>12}",
        "Total", trial.total_debit, trial.total_credit
    );

    let discrepancies = service.verify_ledger(org).await?;
    anyhow::ensure!(trial.is_balanced(), "trial balance does not balance");
    anyhow::ensure!(
        discrepancies.is_empty(),
        "{} account balances disagree with the journal",
        discrepancies.len()
    );
    info!("Seeding complete");
    Ok(())
}

async fn seed_chart(service: &Service, org: OrganizationId, config: &AppConfig) -> anyhow::Result<()> {
    let codes = &config.ledger.accounts;
    let chart = [
        (&codes.cash, "Cash", AccountNature::Asset),
        (&codes.receivable, "Accounts Receivable", AccountNature::Asset),
        (&codes.inventory, "Inventory", AccountNature::Asset),
        (&codes.input_cgst, "Input CGST", AccountNature::Asset),
        (&codes.input_sgst, "Input SGST", AccountNature::Asset),
        (&codes.input_igst, "Input IGST", AccountNature::Asset),
        (&codes.payable, "Accounts Payable", AccountNature::Liability),
        (&codes.output_cgst, "Output CGST", AccountNature::Liability),
        (&codes.output_sgst, "Output SGST", AccountNature::Liability),
        (&codes.output_igst, "Output IGST", AccountNature::Liability),
        (&codes.sales, "Sales", AccountNature::Income),
        (&codes.sales_returns, "Sales Returns", AccountNature::Expense),
        (&codes.cost_of_goods_sold, "Cost of Goods Sold", AccountNature::Expense),
        (&codes.purchases, "Purchases", AccountNature::Expense),
        (&codes.purchase_returns, "Purchase Returns", AccountNature::Income),
        (&codes.stock_adjustment, "Stock Adjustment", AccountNature::Expense),
    ];

    let count = chart.len();
    for (code, name, nature) in chart {
        service
            .open_account(NewLedgerAccount {
                organization_id: org,
                code: code.clone(),
                name: name.to_string(),
                nature,
                opening_balance: Balance::zero(nature),
            })
            .await
            .with_context(|| format!("Failed to open account {code}"))?;
    }
    info!(accounts = count, "Chart of accounts opened");
    Ok(())
}

fn goods(
    item_id: ItemId,
    warehouse_id: WarehouseId,
    quantity: i64,
    unit_price: Decimal,
    direction: StockDirection,
    rate: Decimal,
) -> LineItem {
    LineItem::goods(
        "Widget",
        Quantity::units(quantity),
        unit_price,
        Some(rate),
        StockLine {
            item_id,
            warehouse_id,
            direction,
        },
    )
}

async fn approve(service: &Service, document_id: DocumentId) -> anyhow::Result<()> {
    service
        .post_document_transition(document_id, DocumentStatus::Draft, DocumentStatus::Pending)
        .await?;
    let receipt = service
        .post_document_transition_with_retry(
            document_id,
            DocumentStatus::Pending,
            DocumentStatus::Approved,
        )
        .await?;
    info!(
        document_id = %document_id,
        entries = receipt.journal_entry_ids.len(),
        cost_of_goods = %receipt.cost_of_goods,
        "Approved"
    );
    Ok(())
}

/// Hands out sequential document numbers per kind.
#[derive(Default)]
struct Numbering {
    next: u32,
}

impl Numbering {
    #[allow(clippy::too_many_arguments)]
    async fn draft(
        &mut self,
        service: &Service,
        org: OrganizationId,
        kind: DocumentKind,
        party_id: PartyId,
        date: NaiveDate,
        lines: Vec<LineItem>,
        settles: Option<DocumentId>,
    ) -> anyhow::Result<Document> {
        self.next += 1;
        let document = service
            .create_draft(NewDocument {
                organization_id: org,
                kind,
                number: format!("{}-{:04}", kind.as_str(), self.next),
                party_id: Some(party_id),
                date,
                due_date: date.checked_add_days(chrono::Days::new(30)),
                valid_until: None,
                lines,
                settles,
            })
            .await?;
        Ok(document)
    }
}
