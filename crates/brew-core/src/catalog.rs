//! Menu catalog
//!
//! The orderable items grouped by category. [`Catalog::house_menu`] is the
//! menu served on the site.

use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Menu item identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuItemId(pub u32);

impl fmt::Display for MenuItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Menu sections shown as tabs on the order page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Coffee,
    Tea,
    Pastries,
    Breakfast,
}

/// A single orderable product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub price: Money,
    pub description: String,
    pub category: Category,
}

impl MenuItem {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        price: Money,
        description: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            id: MenuItemId(id),
            name: name.into(),
            price,
            description: description.into(),
            category,
        }
    }
}

/// Ordered collection of menu items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<MenuItem>,
}

impl Catalog {
    #[must_use]
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self { items }
    }

    /// The café's standing menu
    #[must_use]
    pub fn house_menu() -> Self {
        use Category::{Breakfast, Coffee, Pastries, Tea};
        let item = |id, name, cents, description, category| {
            MenuItem::new(id, name, Money::from_cents(cents), description, category)
        };
        Self::new(vec![
            item(1, "Espresso", 350, "Rich, concentrated shot", Coffee),
            item(2, "Cappuccino", 475, "Espresso with steamed milk", Coffee),
            item(3, "Latte", 500, "Smooth espresso with milk", Coffee),
            item(4, "Americano", 400, "Espresso shots with hot water", Coffee),
            item(5, "Mocha", 550, "Chocolate espresso with milk", Coffee),
            item(6, "Cold Brew", 475, "Slow-steeped for 18 hours", Coffee),
            item(7, "Earl Grey", 400, "Black tea with bergamot", Tea),
            item(8, "Green Tea", 400, "Japanese sencha", Tea),
            item(9, "Chamomile", 425, "Floral herbal infusion", Tea),
            item(10, "Chai Latte", 525, "Spiced tea with milk", Tea),
            item(11, "Butter Croissant", 375, "Flaky French-style croissant", Pastries),
            item(12, "Chocolate Croissant", 425, "Croissant filled with rich chocolate", Pastries),
            item(13, "Blueberry Muffin", 350, "Soft muffin loaded with blueberries", Pastries),
            item(14, "Cinnamon Roll", 450, "Warm roll with cinnamon glaze", Pastries),
            item(15, "Almond Danish", 425, "Buttery pastry with almond filling", Pastries),
            item(16, "Avocado Toast", 675, "Sourdough topped with smashed avocado", Breakfast),
            item(17, "Egg & Cheese Sandwich", 550, "Scrambled eggs with melted cheese", Breakfast),
            item(18, "Bacon & Egg Croissant", 625, "Croissant with crispy bacon and egg", Breakfast),
            item(19, "Pancake Stack", 695, "Fluffy pancakes with maple syrup", Breakfast),
            item(20, "Greek Yogurt Bowl", 595, "Yogurt with granola and fresh fruits", Breakfast),
        ])
    }

    #[must_use]
    pub fn get(&self, id: MenuItemId) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items of one category in menu order
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &MenuItem> + '_ {
        self.items.iter().filter(move |item| item.category == category)
    }

    #[must_use]
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn house_menu_has_every_section() {
        let menu = Catalog::house_menu();
        assert_eq!(menu.len(), 20);
        assert_eq!(menu.in_category(Category::Coffee).count(), 6);
        assert_eq!(menu.in_category(Category::Tea).count(), 4);
        assert_eq!(menu.in_category(Category::Pastries).count(), 5);
        assert_eq!(menu.in_category(Category::Breakfast).count(), 5);
    }

    #[test]
    fn lookup_by_id() {
        let menu = Catalog::house_menu();
        let latte = menu.get(MenuItemId(3)).unwrap();
        assert_eq!(latte.name, "Latte");
        assert_eq!(latte.price, Money::from_cents(500));
        assert!(menu.get(MenuItemId(99)).is_none());
    }
}
