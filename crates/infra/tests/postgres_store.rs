//! Postgres store tests.
//!
//! Skipped unless `TEST_DATABASE_URL` points at a disposable database.

use std::sync::Arc;

use invoicer_core::InvoiceId;
use invoicer_infra::store::schema::ensure_schema;
use invoicer_infra::{InvoiceService, InvoiceStore, NewInvoice, PostgresInvoiceStore, WriteOutcome};
use invoicer_invoicing::{InvoiceDraft, InvoiceInput, InvoiceStatus, LineItemInput, ListParams};

async fn store() -> Option<PostgresInvoiceStore> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set; skipping");
            return None;
        }
    };
    let store = PostgresInvoiceStore::connect(&url, 5).await.unwrap();
    ensure_schema(store.pool()).await.unwrap();
    Some(store)
}

fn input(client: &str, items: Vec<(&str, &str, &str)>) -> InvoiceInput {
    InvoiceInput {
        client_name: Some(client.to_string()),
        client_address: Some("9 Quay St".to_string()),
        issue_date: Some("2024-05-01".to_string()),
        due_date: Some("2024-05-15".to_string()),
        status: None,
        items: Some(
            items
                .into_iter()
                .map(|(d, q, p)| LineItemInput {
                    description: Some(d.to_string()),
                    quantity: Some(q.to_string()),
                    unit_price: Some(p.to_string()),
                })
                .collect(),
        ),
    }
}

#[tokio::test]
async fn create_get_update_delete_round_trip() {
    let Some(store) = store().await else { return };
    let svc = InvoiceService::new(Arc::new(store));

    let created = svc
        .create(input("Pg Client", vec![("first", "2", "10.005"), ("second", "1", "0.10")]))
        .await
        .unwrap();
    assert_eq!(created.total_amount.to_string(), "20.11");
    assert_eq!(created.status, InvoiceStatus::Draft);

    let loaded = svc.get(created.id).await.unwrap();
    let descriptions: Vec<_> = loaded.items.iter().map(|i| i.description.as_str()).collect();
    assert_eq!(descriptions, ["first", "second"]);
    assert_eq!(loaded.items[0].unit_price.to_string(), "10.005");
    assert_eq!(loaded.items_total().unwrap(), loaded.invoice.total_amount);

    let mut changed = input("Pg Client", vec![("only", "3", "2")]);
    changed.status = Some("Sent".to_string());
    assert_eq!(svc.update(created.id, changed).await.unwrap(), WriteOutcome::Applied);

    let loaded = svc.get(created.id).await.unwrap();
    assert_eq!(loaded.items.len(), 1);
    assert_eq!(loaded.invoice.total_amount.to_string(), "6.00");
    assert_eq!(loaded.invoice.status, InvoiceStatus::Sent);

    // Omitting status keeps it.
    svc.update(created.id, input("Pg Client", vec![("only", "1", "2")]))
        .await
        .unwrap();
    assert_eq!(svc.get(created.id).await.unwrap().invoice.status, InvoiceStatus::Sent);

    assert_eq!(svc.delete(created.id).await.unwrap(), WriteOutcome::Applied);
    assert!(svc.get(created.id).await.is_err());
    assert_eq!(svc.delete(created.id).await.unwrap(), WriteOutcome::NotFound);
}

#[tokio::test]
async fn duplicate_number_maps_to_unique_violation() {
    let Some(store) = store().await else { return };
    let draft = InvoiceDraft::parse(input("Dup", vec![("x", "1", "1")])).unwrap();
    let number = format!("INV-TEST-{}", InvoiceId::new());

    let first = NewInvoice {
        id: InvoiceId::new(),
        invoice_number: number.clone(),
        draft: draft.clone(),
    };
    store.insert(&first).await.unwrap();

    let second = NewInvoice {
        id: InvoiceId::new(),
        invoice_number: number,
        draft,
    };
    let err = store.insert(&second).await.unwrap_err();
    assert_eq!(err.code(), "UNIQUE_VIOLATION");

    store.delete(first.id).await.unwrap();
}

#[tokio::test]
async fn search_escapes_like_metacharacters() {
    let Some(store) = store().await else { return };
    let svc = InvoiceService::new(Arc::new(store));
    let marker = format!("100%_{}", InvoiceId::new());
    let created = svc
        .create(input(&marker, vec![("x", "1", "1")]))
        .await
        .unwrap();

    let page = svc
        .list(ListParams::normalize(None, None, Some(&marker.to_uppercase())))
        .await
        .unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.items[0].id, created.id);

    let page = svc
        .list(ListParams::normalize(None, None, Some("100x_")))
        .await
        .unwrap();
    assert!(page.items.iter().all(|i| i.id != created.id));

    svc.delete(created.id).await.unwrap();
}

#[tokio::test]
async fn health_pings_the_database() {
    let Some(store) = store().await else { return };
    store.ping().await.unwrap();
}
