use tracing::{debug, info};

use super::{
    dto::AddToCart,
    model::{Cart, CartTotals},
};
use crate::{
    catalog::repo::CatalogStore,
    error::{AppError, AppResult},
};

/// Adds a line for an available product. Unknown or unavailable products
/// leave the cart untouched.
pub async fn add_item(catalog: &dyn CatalogStore, cart: &mut Cart, req: &AddToCart) -> AppResult<CartTotals> {
    let unavailable = || AppError::not_found("product is not available");
    let product_id = req.product_id.ok_or_else(unavailable)?;
    let product = catalog
        .find_product(product_id)
        .await?
        .filter(|p| p.is_available)
        .ok_or_else(unavailable)?;

    let item = cart.add(&product, req.qty, &req.choice, req.notes.as_deref());
    info!(item_id = item.id, product = %item.name, qty = item.qty, price = item.price, "cart line added");
    Ok(cart.totals())
}

pub fn update_quantity(cart: &mut Cart, item_id: u64, qty: i64) -> AppResult<CartTotals> {
    if !cart.update_quantity(item_id, qty) {
        return Err(AppError::not_found("cart item not found"));
    }
    debug!(item_id, qty, "cart line updated");
    Ok(cart.totals())
}

pub fn remove(cart: &mut Cart, item_id: u64) -> CartTotals {
    if cart.remove(item_id) {
        debug!(item_id, "cart line removed");
    }
    cart.totals()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cart::model::VariantChoice, testing::{product, MemoryCatalog}};
    use uuid::Uuid;

    fn request(product_id: Uuid, qty: i64, size: Option<&str>) -> AddToCart {
        AddToCart {
            product_id: Some(product_id),
            qty,
            choice: VariantChoice {
                size: size.map(Into::into),
                ..Default::default()
            },
            notes: None,
        }
    }

    #[tokio::test]
    async fn adds_available_product_with_surcharge() {
        let latte = product("Latte", 20_000, true);
        let catalog = MemoryCatalog::with_products(vec![latte.clone()]);
        let mut cart = Cart::default();

        let totals = add_item(&catalog, &mut cart, &request(latte.id, 2, Some("Large")))
            .await
            .expect("added");

        assert_eq!(totals, CartTotals { item_count: 2, total: 2 * (20_000 + latte.large_price_add) });
    }

    #[tokio::test]
    async fn unavailable_or_unknown_product_is_not_found() {
        let sold_out = product("Croissant", 15_000, false);
        let catalog = MemoryCatalog::with_products(vec![sold_out.clone()]);
        let mut cart = Cart::default();
        cart.add(&product("Tea", 8_000, true), 1, &VariantChoice::default(), None);
        let before = cart.items().to_vec();

        for req in [
            request(sold_out.id, 1, None),
            request(Uuid::new_v4(), 1, None),
            AddToCart { product_id: None, ..request(sold_out.id, 1, None) },
        ] {
            let err = add_item(&catalog, &mut cart, &req).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)));
            assert_eq!(cart.items(), before.as_slice());
        }
    }

    #[test]
    fn update_missing_line_is_not_found() {
        let mut cart = Cart::default();
        assert!(matches!(update_quantity(&mut cart, 1, 2), Err(AppError::NotFound(_))));
    }

    #[test]
    fn remove_missing_line_still_reports_totals() {
        let mut cart = Cart::default();
        cart.add(&product("Tea", 8_000, true), 3, &VariantChoice::default(), None);
        assert_eq!(remove(&mut cart, 42), CartTotals { item_count: 3, total: 24_000 });
    }
}
