use serde::Serialize;
use uuid::Uuid;

use crate::catalog::repo_types::Product;

pub const SIZE_LARGE: &str = "Large";

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QTY: i64 = 999;

/// One cart line. Name, price and image are copied from the product when the
/// line is added and are never refreshed from the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: u64,
    pub product_id: Uuid,
    pub name: String,
    pub price: i64,
    pub qty: i64,
    pub variant_info: String,
    pub notes: String,
    pub image: String,
}

impl CartItem {
    pub fn subtotal(&self) -> i64 {
        self.price.saturating_mul(self.qty)
    }
}

/// Customer option picks for a drink or dish.
#[derive(Debug, Clone, Default)]
pub struct VariantChoice {
    pub temperature: Option<String>,
    pub sugar: Option<String>,
    pub size: Option<String>,
}

impl VariantChoice {
    /// Non-empty picks joined in temperature, sugar, size order.
    pub fn describe(&self) -> String {
        [&self.temperature, &self.sugar, &self.size]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn is_large(&self) -> bool {
        self.size.as_deref() == Some(SIZE_LARGE)
    }
}

/// Base price plus the large-size surcharge when the product offers sizes.
pub fn unit_price(product: &Product, choice: &VariantChoice) -> i64 {
    if choice.is_large() && product.has_size_option {
        product.price + product.large_price_add
    } else {
        product.price
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    last_id: u64,
}

impl Cart {
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends a new line; ids are never reused within a session.
    pub fn add(
        &mut self,
        product: &Product,
        qty: i64,
        choice: &VariantChoice,
        notes: Option<&str>,
    ) -> &CartItem {
        self.last_id += 1;
        self.items.push(CartItem {
            id: self.last_id,
            product_id: product.id,
            name: product.name.clone(),
            price: unit_price(product, choice),
            qty: qty.clamp(1, MAX_LINE_QTY),
            variant_info: choice.describe(),
            notes: notes.unwrap_or_default().to_string(),
            image: product.image.clone(),
        });
        &self.items[self.items.len() - 1]
    }

    /// Sets the quantity of a line, removing it when `qty <= 0` and capping it
    /// at [`MAX_LINE_QTY`]. Returns `false` if the line does not exist.
    pub fn update_quantity(&mut self, item_id: u64, qty: i64) -> bool {
        let Some(idx) = self.items.iter().position(|i| i.id == item_id) else {
            return false;
        };
        if qty <= 0 {
            self.items.remove(idx);
        } else {
            self.items[idx].qty = qty.min(MAX_LINE_QTY);
        }
        true
    }

    /// Idempotent; returns whether a line was removed.
    pub fn remove(&mut self, item_id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn totals(&self) -> CartTotals {
        self.items.iter().fold(CartTotals::default(), |acc, i| CartTotals {
            item_count: acc.item_count.saturating_add(i.qty),
            total: acc.total.saturating_add(i.subtotal()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latte() -> Product {
        Product {
            id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            name: "Caffe Latte".into(),
            price: 25_000,
            description: None,
            image: "latte.jpg".into(),
            is_available: true,
            has_temperature_option: true,
            has_sugar_option: true,
            has_size_option: true,
            large_price_add: 5_000,
        }
    }

    fn choice(t: Option<&str>, s: Option<&str>, z: Option<&str>) -> VariantChoice {
        VariantChoice {
            temperature: t.map(Into::into),
            sugar: s.map(Into::into),
            size: z.map(Into::into),
        }
    }

    fn assert_totals_consistent(cart: &Cart) {
        let t = cart.totals();
        let qty: i64 = cart.items().iter().map(|i| i.qty).sum();
        let sum: i64 = cart.items().iter().map(|i| i.price * i.qty).sum();
        assert_eq!(t.item_count, qty);
        assert_eq!(t.total, sum);
    }

    #[test]
    fn variant_description_follows_fixed_order() {
        assert_eq!(choice(Some("Ice"), Some("Less"), Some("Large")).describe(), "Ice, Less, Large");
        assert_eq!(choice(None, Some("Normal"), None).describe(), "Normal");
        assert_eq!(choice(Some(""), None, Some("Regular")).describe(), "Regular");
        assert_eq!(VariantChoice::default().describe(), "");
    }

    #[test]
    fn large_surcharge_needs_size_option() {
        let mut p = latte();
        assert_eq!(unit_price(&p, &choice(None, None, Some("Large"))), 30_000);
        assert_eq!(unit_price(&p, &choice(None, None, Some("Regular"))), 25_000);
        p.has_size_option = false;
        assert_eq!(unit_price(&p, &choice(None, None, Some("Large"))), 25_000);
    }

    #[test]
    fn add_snapshots_price_and_assigns_unique_ids() {
        let mut p = latte();
        let mut cart = Cart::default();
        let first = cart.add(&p, 2, &choice(Some("Hot"), None, Some("Large")), Some("extra shot")).id;
        p.price = 99_000;
        let second = cart.add(&p, 1, &VariantChoice::default(), None).id;

        assert_ne!(first, second);
        assert_eq!(cart.items()[0].price, 30_000);
        assert_eq!(cart.items()[0].variant_info, "Hot, Large");
        assert_eq!(cart.items()[0].notes, "extra shot");
        assert_eq!(cart.totals(), CartTotals { item_count: 3, total: 60_000 + 99_000 });
        assert_totals_consistent(&cart);
    }

    #[test]
    fn non_positive_add_quantity_becomes_one() {
        let mut cart = Cart::default();
        cart.add(&latte(), 0, &VariantChoice::default(), None);
        assert_eq!(cart.items()[0].qty, 1);
    }

    #[test]
    fn quantities_are_capped_per_line() {
        let p = latte();
        let mut cart = Cart::default();
        let id = cart.add(&p, i64::MAX, &VariantChoice::default(), None).id;
        assert_eq!(cart.items()[0].qty, MAX_LINE_QTY);

        assert!(cart.update_quantity(id, i64::MAX));
        assert_eq!(cart.items()[0].qty, MAX_LINE_QTY);
        assert_eq!(cart.totals().total, 25_000 * MAX_LINE_QTY);
        assert_totals_consistent(&cart);
    }

    #[test]
    fn totals_saturate_instead_of_wrapping() {
        let mut p = latte();
        p.price = i64::MAX / 2;
        let mut cart = Cart::default();
        cart.add(&p, 3, &VariantChoice::default(), None);
        cart.add(&p, 3, &VariantChoice::default(), None);
        assert_eq!(cart.totals().total, i64::MAX);
    }

    #[test]
    fn update_to_zero_removes_exactly_one_line() {
        let p = latte();
        let mut cart = Cart::default();
        let a = cart.add(&p, 1, &VariantChoice::default(), None).id;
        cart.add(&p, 3, &VariantChoice::default(), None);

        assert!(cart.update_quantity(a, 0));
        assert_eq!(cart.len(), 1);
        assert_totals_consistent(&cart);
    }

    #[test]
    fn update_sets_quantity_and_reports_missing() {
        let mut cart = Cart::default();
        let id = cart.add(&latte(), 1, &VariantChoice::default(), None).id;
        assert!(cart.update_quantity(id, 4));
        assert_eq!(cart.totals().item_count, 4);
        assert!(!cart.update_quantity(id + 100, 2));
        assert_totals_consistent(&cart);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut cart = Cart::default();
        let id = cart.add(&latte(), 1, &VariantChoice::default(), None).id;
        assert!(cart.remove(id));
        assert!(!cart.remove(id));
        assert!(cart.is_empty());
        assert_eq!(cart.totals(), CartTotals::default());
    }

    #[test]
    fn ids_keep_growing_after_clear() {
        let mut cart = Cart::default();
        let a = cart.add(&latte(), 1, &VariantChoice::default(), None).id;
        cart.clear();
        let b = cart.add(&latte(), 1, &VariantChoice::default(), None).id;
        assert!(b > a);
    }

    #[test]
    fn totals_hold_across_mixed_operations() {
        let p = latte();
        let mut cart = Cart::default();
        let mut ids = Vec::new();
        for (i, size) in [None, Some("Large"), Some("Regular"), Some("Large")].into_iter().enumerate() {
            ids.push(cart.add(&p, i as i64 + 1, &choice(None, None, size), None).id);
            assert_totals_consistent(&cart);
        }
        cart.update_quantity(ids[1], 7);
        assert_totals_consistent(&cart);
        cart.update_quantity(ids[2], -1);
        assert_totals_consistent(&cart);
        cart.remove(ids[0]);
        assert_totals_consistent(&cart);
        assert_eq!(cart.len(), 2);
    }
}
