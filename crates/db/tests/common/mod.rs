//! Shared fixture for the posting integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use bahi_core::clock::FixedClock;
use bahi_core::document::{Document, DocumentKind, DocumentStatus, LineItem, NewDocument, StockLine};
use bahi_core::inventory::{CostLayer, StockDirection, ValuationMethod, NewInventoryItem};
use bahi_core::ledger::{AccountNature, Balance, NewLedgerAccount};
use bahi_core::posting::{PostingReceipt, PostingService, TransitionError};
use bahi_core::repository::{Repository, RepositoryTx};
use bahi_db::{MemoryStore, StaticPartyDirectory};
use bahi_shared::config::{AccountCodes, AppConfig, LedgerConfig, RetryConfig, TaxConfig};
use bahi_shared::types::{
    Amount, DocumentId, ItemId, LedgerAccountId, OrganizationId, PartyId, Quantity, WarehouseId,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Chart of accounts seeded for every test organization.
pub const CHART: &[(&str, &str, AccountNature)] = &[
    ("1100", "Cash", AccountNature::Asset),
    ("1200", "Accounts Receivable", AccountNature::Asset),
    ("1300", "Inventory", AccountNature::Asset),
    ("1410", "Input CGST", AccountNature::Asset),
    ("1420", "Input SGST", AccountNature::Asset),
    ("1430", "Input IGST", AccountNature::Asset),
    ("2100", "Accounts Payable", AccountNature::Liability),
    ("2310", "Output CGST", AccountNature::Liability),
    ("2320", "Output SGST", AccountNature::Liability),
    ("2330", "Output IGST", AccountNature::Liability),
    ("3000", "Owner Capital", AccountNature::Equity),
    ("4100", "Sales", AccountNature::Income),
    ("4200", "Sales Returns", AccountNature::Expense),
    ("5100", "Cost of Goods Sold", AccountNature::Expense),
    ("5200", "Purchases", AccountNature::Expense),
    ("5300", "Purchase Returns", AccountNature::Income),
    ("5400", "Stock Adjustment", AccountNature::Expense),
];

pub const HOME: &str = "KA";

pub fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

pub fn config() -> AppConfig {
    AppConfig {
        ledger: LedgerConfig {
            accounts: AccountCodes::default(),
        },
        tax: TaxConfig {
            home_jurisdiction: HOME.to_string(),
        },
        retry: RetryConfig {
            max_attempts: 5,
            initial_backoff_ms: 1,
            max_backoff_ms: 10,
        },
    }
}

pub struct Fixture {
    pub store: MemoryStore,
    pub service: PostingService<MemoryStore>,
    pub org: OrganizationId,
    /// Customer in the home jurisdiction.
    pub local_customer: PartyId,
    /// Customer in another jurisdiction.
    pub remote_customer: PartyId,
    /// Vendor in the home jurisdiction.
    pub vendor: PartyId,
    pub warehouse: WarehouseId,
    pub accounts: HashMap<&'static str, LedgerAccountId>,
    next_number: std::sync::atomic::AtomicU32,
}

impl Fixture {
    /// Store with the full chart of accounts, dated 2024-04-15.
    pub async fn new() -> Self {
        let fixture = Self::without_chart();
        let mut accounts = HashMap::new();
        for (code, name, nature) in CHART {
            let account = fixture
                .service
                .open_account(NewLedgerAccount {
                    organization_id: fixture.org,
                    code: (*code).to_string(),
                    name: (*name).to_string(),
                    nature: *nature,
                    opening_balance: Balance::zero(*nature),
                })
                .await
                .unwrap();
            accounts.insert(*code, account.id);
        }
        Self {
            accounts,
            ..fixture
        }
    }

    /// Store without any ledger accounts.
    pub fn without_chart() -> Self {
        let store = MemoryStore::new();
        let local_customer = PartyId::new();
        let remote_customer = PartyId::new();
        let vendor = PartyId::new();
        let parties = StaticPartyDirectory::new()
            .with_party(local_customer, HOME)
            .with_party(remote_customer, "MH")
            .with_party(vendor, HOME);
        let service = PostingService::new(store.clone(), Arc::new(parties), &config())
            .with_clock(Arc::new(FixedClock(date(4, 15))));

        Self {
            store,
            service,
            org: OrganizationId::new(),
            local_customer,
            remote_customer,
            vendor,
            warehouse: WarehouseId::new(),
            accounts: HashMap::new(),
            next_number: std::sync::atomic::AtomicU32::new(1),
        }
    }

    pub fn account(&self, code: &str) -> LedgerAccountId {
        self.accounts[code]
    }

    /// Balance signed relative to the account's natural side.
    pub async fn balance(&self, code: &str) -> Amount {
        self.service
            .get_ledger_balance(self.account(code))
            .await
            .unwrap()
    }

    pub async fn item(&self, sku: &str, method: ValuationMethod) -> ItemId {
        self.service
            .register_item(NewInventoryItem {
                organization_id: self.org,
                sku: sku.to_string(),
                name: format!("Item {sku}"),
                valuation_method: method,
            })
            .await
            .unwrap()
            .id
    }

    fn number(&self, prefix: &str) -> String {
        let n = self
            .next_number
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        format!("{prefix}-{n:04}")
    }

    pub async fn draft(
        &self,
        kind: DocumentKind,
        party_id: Option<PartyId>,
        lines: Vec<LineItem>,
        settles: Option<DocumentId>,
    ) -> Document {
        self.service
            .create_draft(NewDocument {
                organization_id: self.org,
                kind,
                number: self.number(kind.as_str()),
                party_id,
                date: date(4, 10),
                due_date: Some(date(5, 10)),
                valid_until: None,
                lines,
                settles,
            })
            .await
            .unwrap()
    }

    /// DRAFT -> PENDING -> APPROVED.
    pub async fn approve(&self, document_id: DocumentId) -> Result<PostingReceipt, TransitionError> {
        self.service
            .post_document_transition(document_id, DocumentStatus::Draft, DocumentStatus::Pending)
            .await?;
        self.service
            .post_document_transition(document_id, DocumentStatus::Pending, DocumentStatus::Approved)
            .await
    }

    pub async fn cancel(
        &self,
        document_id: DocumentId,
        from: DocumentStatus,
    ) -> Result<PostingReceipt, TransitionError> {
        self.service
            .post_document_transition(document_id, from, DocumentStatus::Cancelled)
            .await
    }

    /// Approved service invoice of one line.
    pub async fn service_invoice(
        &self,
        party_id: PartyId,
        price: Decimal,
        rate: Option<Decimal>,
    ) -> Document {
        let invoice = self
            .draft(
                DocumentKind::Invoice,
                Some(party_id),
                vec![LineItem::service("Consulting", Quantity::units(1), price, rate)],
                None,
            )
            .await;
        self.approve(invoice.id).await.unwrap();
        invoice
    }

    /// Receives stock through an approved, untaxed bill.
    pub async fn stock_in(&self, item_id: ItemId, quantity: i64, unit_cost: Decimal) -> Document {
        let bill = self
            .draft(
                DocumentKind::Bill,
                Some(self.vendor),
                vec![self.goods(item_id, quantity, unit_cost, StockDirection::In)],
                None,
            )
            .await;
        self.approve(bill.id).await.unwrap();
        bill
    }

    /// Drafts an untaxed invoice selling `quantity` units and tries to approve it.
    pub async fn sell(
        &self,
        item_id: ItemId,
        quantity: i64,
        price: Decimal,
    ) -> (Document, Result<PostingReceipt, TransitionError>) {
        let invoice = self
            .draft(
                DocumentKind::Invoice,
                Some(self.local_customer),
                vec![self.goods(item_id, quantity, price, StockDirection::Out)],
                None,
            )
            .await;
        let result = self.approve(invoice.id).await;
        (invoice, result)
    }

    pub fn goods(
        &self,
        item_id: ItemId,
        quantity: i64,
        price: Decimal,
        direction: StockDirection,
    ) -> LineItem {
        LineItem::goods(
            "Widget",
            Quantity::units(quantity),
            price,
            None,
            StockLine {
                item_id,
                warehouse_id: self.warehouse,
                direction,
            },
        )
    }

    pub async fn layers(&self, item_id: ItemId, warehouse_id: WarehouseId) -> Vec<CostLayer> {
        let mut tx = self.store.begin().await.unwrap();
        tx.lock_cost_layers(item_id, warehouse_id).await.unwrap()
    }

    pub async fn status(&self, document_id: DocumentId) -> DocumentStatus {
        self.service.get_document(document_id).await.unwrap().status
    }

    /// Asserts the cached balances agree with the journal and the trial balance is even.
    pub async fn assert_ledger_consistent(&self) {
        assert!(self.service.verify_ledger(self.org).await.unwrap().is_empty());
        assert!(self.service.trial_balance(self.org).await.unwrap().is_balanced());
    }
}
