use super::{
    dto::MenuSection,
    repo_types::{Category, ProductListing},
};

/// Buckets products under their category, keeping the category order given.
/// Categories without products are kept so the menu tabs stay stable.
pub fn group_menu(categories: Vec<Category>, products: Vec<ProductListing>) -> Vec<MenuSection> {
    let mut sections: Vec<MenuSection> = categories
        .into_iter()
        .map(|category| MenuSection {
            category,
            items: Vec::new(),
        })
        .collect();
    for listing in products {
        if let Some(section) = sections
            .iter_mut()
            .find(|s| s.category.id == listing.product.category_id)
        {
            section.items.push(listing);
        }
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repo_types::Product;
    use uuid::Uuid;

    fn category(name: &str, sort_order: i32) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: "fa-tag".into(),
            sort_order,
            is_active: true,
        }
    }

    fn listing(cat: &Category, name: &str) -> ProductListing {
        ProductListing {
            product: Product {
                id: Uuid::new_v4(),
                category_id: cat.id,
                name: name.into(),
                price: 10_000,
                description: None,
                image: "x.jpg".into(),
                is_available: true,
                has_temperature_option: false,
                has_sugar_option: false,
                has_size_option: false,
                large_price_add: 5_000,
            },
            category_name: cat.name.clone(),
        }
    }

    #[test]
    fn groups_in_category_order_and_drops_orphans() {
        let kopi = category("Kopi", 1);
        let snack = category("Snack", 4);
        let hidden = category("Hidden", 9);
        let products = vec![
            listing(&snack, "Fries"),
            listing(&kopi, "Americano"),
            listing(&hidden, "Secret"),
            listing(&kopi, "Latte"),
        ];

        let sections = group_menu(vec![kopi.clone(), snack.clone()], products);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].category.name, "Kopi");
        let names: Vec<_> = sections[0].items.iter().map(|l| l.product.name.as_str()).collect();
        assert_eq!(names, ["Americano", "Latte"]);
        assert_eq!(sections[1].items.len(), 1);
    }
}
