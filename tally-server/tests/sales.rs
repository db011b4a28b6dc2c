//! Sale recording: stock decrement, insufficiency, and statistics.

mod common;

use common::{owner_with_store, test_state};
use shared::error::ErrorCode;
use shared::models::{InventoryCreate, SaleCreate, SaleItemInput};
use tally_server::db::repository::{inventory, sale};

async fn seed_item(
    state: &tally_server::core::ServerState,
    store_id: i64,
    created_by: i64,
    sku: &str,
    quantity: i64,
    selling_price: f64,
) -> shared::models::InventoryItem {
    inventory::create(
        &state.pool,
        store_id,
        created_by,
        &InventoryCreate {
            product_name: format!("Product {sku}"),
            sku: sku.to_string(),
            cost_price: Some(selling_price / 2.0),
            selling_price,
            quantity,
            low_stock_threshold: Some(2),
            high_stock_threshold: None,
            status: None,
            description: None,
            expires_at: None,
        },
        None,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn sale_decrements_stock_and_computes_totals() {
    let state = test_state().await;
    let (owner, store, _) = owner_with_store(&state, "till-owner", "Till Mart").await;

    let item = seed_item(&state, store.id, owner.id, "SKU-001", 10, 4.0).await;

    let recorded = state
        .sales()
        .create_sale(
            store.id,
            owner.id,
            SaleCreate {
                payment_method: "cash".to_string(),
                amount_paid: 20.0,
                items: vec![SaleItemInput {
                    inventory_item_id: item.id,
                    quantity: 3,
                    unit_price: 4.0,
                }],
            },
        )
        .await
        .unwrap();

    assert_eq!(recorded.sale.total_amount, 12.0);
    assert_eq!(recorded.sale.change_given, 8.0);
    assert_eq!(recorded.sale.outstanding_balance, 0.0);
    assert_eq!(recorded.items.len(), 1);
    assert_eq!(recorded.items[0].product_name, "Product SKU-001");

    let after = inventory::find_by_id(&state.pool, item.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.quantity, 7);
}

#[tokio::test]
async fn underpayment_leaves_outstanding_balance() {
    let state = test_state().await;
    let (owner, store, _) = owner_with_store(&state, "credit-owner", "Credit Mart").await;

    let item = seed_item(&state, store.id, owner.id, "SKU-002", 5, 10.0).await;

    let recorded = state
        .sales()
        .create_sale(
            store.id,
            owner.id,
            SaleCreate {
                payment_method: "transfer".to_string(),
                amount_paid: 15.0,
                items: vec![SaleItemInput {
                    inventory_item_id: item.id,
                    quantity: 2,
                    unit_price: 10.0,
                }],
            },
        )
        .await
        .unwrap();

    assert_eq!(recorded.sale.total_amount, 20.0);
    assert_eq!(recorded.sale.change_given, 0.0);
    assert_eq!(recorded.sale.outstanding_balance, 5.0);
}

#[tokio::test]
async fn insufficient_stock_fails_and_rolls_back() {
    let state = test_state().await;
    let (owner, store, _) = owner_with_store(&state, "short-owner", "Short Mart").await;

    let plenty = seed_item(&state, store.id, owner.id, "SKU-A", 10, 1.0).await;
    let scarce = seed_item(&state, store.id, owner.id, "SKU-B", 1, 1.0).await;

    let err = state
        .sales()
        .create_sale(
            store.id,
            owner.id,
            SaleCreate {
                payment_method: "cash".to_string(),
                amount_paid: 10.0,
                items: vec![
                    SaleItemInput {
                        inventory_item_id: plenty.id,
                        quantity: 5,
                        unit_price: 1.0,
                    },
                    SaleItemInput {
                        inventory_item_id: scarce.id,
                        quantity: 2,
                        unit_price: 1.0,
                    },
                ],
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    // The whole transaction rolled back: the first line's decrement
    // did not stick
    let after = inventory::find_by_id(&state.pool, plenty.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.quantity, 10);
    assert!(sale::find_by_store(&state.pool, store.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn stats_cover_only_non_deleted_sales() {
    let state = test_state().await;
    let (owner, store, _) = owner_with_store(&state, "stats-owner", "Stats Mart").await;

    let item = seed_item(&state, store.id, owner.id, "SKU-S", 100, 5.0).await;

    for paid in [10.0, 5.0] {
        state
            .sales()
            .create_sale(
                store.id,
                owner.id,
                SaleCreate {
                    payment_method: "cash".to_string(),
                    amount_paid: paid,
                    items: vec![SaleItemInput {
                        inventory_item_id: item.id,
                        quantity: 2,
                        unit_price: 5.0,
                    }],
                },
            )
            .await
            .unwrap();
    }

    let stats = sale::stats(&state.pool, store.id).await.unwrap();
    assert_eq!(stats.total_sales, 2);
    assert_eq!(stats.revenue_generated, 20.0);
    assert_eq!(stats.avg_sale_value, 10.0);
    assert_eq!(stats.outstanding_balance, 5.0);

    // Soft-delete one sale; stats shrink accordingly
    let sales = sale::find_by_store(&state.pool, store.id).await.unwrap();
    sale::soft_delete(&state.pool, sales[0].sale.id, owner.id)
        .await
        .unwrap();

    let stats = sale::stats(&state.pool, store.id).await.unwrap();
    assert_eq!(stats.total_sales, 1);
    assert_eq!(stats.revenue_generated, 10.0);
}

#[tokio::test]
async fn empty_sale_is_rejected() {
    let state = test_state().await;
    let (owner, store, _) = owner_with_store(&state, "empty-owner", "Empty Mart").await;

    let err = state
        .sales()
        .create_sale(
            store.id,
            owner.id,
            SaleCreate {
                payment_method: "cash".to_string(),
                amount_paid: 0.0,
                items: vec![],
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SaleEmpty);
}
