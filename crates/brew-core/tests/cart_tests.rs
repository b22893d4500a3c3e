use brew_core::{
    AddOutcome, CartLedger, Catalog, Customization, DeliveryOption, MenuItemId, Money, ShopConfig,
};
use brew_test_utils::espresso_and_latte_cart;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn empty_cart() -> CartLedger {
    CartLedger::new(&ShopConfig::default())
}

#[test]
fn test_espresso_latte_delivery_totals() {
    let mut cart = espresso_and_latte_cart();
    cart.set_delivery(DeliveryOption::Delivery);

    let view = cart.view();
    assert_eq!(view.subtotal, "$12.00");
    assert_eq!(view.tax, "$0.96");
    assert_eq!(view.delivery_fee, "$3.99");
    assert_eq!(view.total, "$16.95");
    assert_eq!(view.item_count, 3);
    assert_eq!(
        view.rows.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(),
        vec!["Espresso x2", "Latte x1"]
    );
}

#[test]
fn test_pickup_drops_the_fee() {
    let mut cart = espresso_and_latte_cart();
    cart.set_delivery(DeliveryOption::Delivery);
    let delivered = cart.totals().total;
    cart.set_delivery(DeliveryOption::Pickup);

    assert_eq!(cart.totals().delivery_fee, Money::ZERO);
    assert_eq!(cart.totals().total + Money::from_cents(399), delivered);
    assert_eq!(cart.view().total, "$12.96");
}

#[test]
fn test_tax_stays_exact_until_display() {
    let menu = Catalog::house_menu();
    let mut cart = empty_cart();
    let pancakes = menu.get(MenuItemId(19)).unwrap();
    cart.add_item(pancakes, 1, Customization::default()).unwrap();

    let totals = cart.totals();
    assert_eq!(totals.tax, Money("0.556".parse().unwrap()));
    assert_eq!(totals.total, Money("7.506".parse().unwrap()));
    assert_eq!(cart.view().tax, "$0.56");
    assert_eq!(cart.view().total, "$7.51");
}

fn item_ids() -> impl Strategy<Value = u32> {
    1u32..=20
}

proptest! {
    #[test]
    fn prop_subtotal_is_order_independent(
        adds in prop::collection::vec((item_ids(), 1u32..5), 1..12)
    ) {
        let menu = Catalog::house_menu();
        let mut forward = empty_cart();
        let mut reverse = empty_cart();
        for (id, qty) in &adds {
            forward.add_item(menu.get(MenuItemId(*id)).unwrap(), *qty, Customization::default()).unwrap();
        }
        for (id, qty) in adds.iter().rev() {
            reverse.add_item(menu.get(MenuItemId(*id)).unwrap(), *qty, Customization::default()).unwrap();
        }
        prop_assert_eq!(forward.totals(), reverse.totals());
        prop_assert_eq!(forward.item_count(), reverse.item_count());
    }

    #[test]
    fn prop_recompute_is_idempotent(
        adds in prop::collection::vec((item_ids(), 1u32..5), 0..8),
        delivery in any::<bool>(),
    ) {
        let menu = Catalog::house_menu();
        let mut cart = empty_cart();
        for (id, qty) in &adds {
            cart.add_item(menu.get(MenuItemId(*id)).unwrap(), *qty, Customization::default()).unwrap();
        }
        if delivery {
            cart.set_delivery(DeliveryOption::Delivery);
        }
        let once = cart.totals();
        cart.recompute();
        cart.recompute();
        prop_assert_eq!(cart.totals(), once);
    }

    #[test]
    fn prop_total_equals_parts(
        adds in prop::collection::vec((item_ids(), 1u32..5), 0..8),
        delivery in any::<bool>(),
    ) {
        let menu = Catalog::house_menu();
        let config = ShopConfig::default();
        let mut cart = CartLedger::new(&config);
        for (id, qty) in &adds {
            cart.add_item(menu.get(MenuItemId(*id)).unwrap(), *qty, Customization::default()).unwrap();
        }
        cart.set_delivery(if delivery { DeliveryOption::Delivery } else { DeliveryOption::Pickup });
        let t = cart.totals();
        prop_assert_eq!(t.total, t.subtotal + t.subtotal.scale(config.tax_rate) + t.delivery_fee);
    }

    #[test]
    fn prop_readding_merges_rows(id in item_ids(), first in 1u32..5, second in 1u32..5) {
        let menu = Catalog::house_menu();
        let item = menu.get(MenuItemId(id)).unwrap();
        let mut cart = empty_cart();
        cart.add_item(item, first, Customization::default()).unwrap();
        let outcome = cart.add_item(item, second, Customization::default()).unwrap();
        prop_assert_eq!(outcome, AddOutcome::Merged { quantity: first + second });
        prop_assert_eq!(cart.items().len(), 1);
        prop_assert_eq!(cart.item_count(), first + second);
    }
}
