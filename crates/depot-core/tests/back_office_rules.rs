//! End-to-end checks of the back-office rules, driven through the same JSON
//! the REST API exchanges.

use chrono::{Datelike, NaiveDate, Weekday};
use depot_core::{
    apply_discount, generate_occurrences, validate_discount, validate_expense, DiscountRecord,
    ExpenseRecord, LineItem, Money, RecurrenceRule, RecurrenceSpec,
};
use serde_json::json;

fn discount(fields: serde_json::Value) -> DiscountRecord {
    let mut base = json!({
        "id": "d-1",
        "name": "Promo",
        "applicationScope": "all_products",
        "status": "active",
        "startDate": "2025-01-01T00:00:00Z",
        "endDate": "2025-12-31T23:59:59Z"
    });
    if let (Some(base), Some(extra)) = (base.as_object_mut(), fields.as_object()) {
        base.extend(extra.clone());
    }
    serde_json::from_value(base).expect("discount json")
}

fn item(price: f64) -> LineItem {
    serde_json::from_value(json!({ "productId": "p-1", "originalPrice": price, "currency": "EUR" }))
        .expect("item json")
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn percentage_discount_matches_formula_for_many_prices() {
    for pct in [0.004, 0.5, 1.0, 12.345, 12.5, 33.0, 50.0, 99.99, 100.0] {
        let record = discount(json!({ "discountType": "percentage", "percentage": pct }));
        assert!(validate_discount(&record).is_empty(), "pct {pct}");

        for minor in [0_i64, 1, 99, 1999, 123_456, 10_000_000] {
            let price = Money::from_minor(minor);
            let result = apply_discount(&record, &item(price.to_major())).unwrap();

            let expected = minor as f64 * (1.0 - pct / 100.0);
            assert!(
                (result.final_price.minor() as f64 - expected).abs() <= 0.5 + 1e-6,
                "pct {pct} price {minor}: got {}",
                result.final_price.minor()
            );
            assert!(!result.final_price.is_negative());
            assert_eq!(result.final_price + result.discount_amount, price);
        }
    }
}

#[test]
fn fixed_amount_final_price_is_exact_regardless_of_original() {
    let record = discount(json!({ "discountType": "fixed_amount", "fixedAmount": 14.99 }));
    for price in [0.0, 5.0, 14.99, 20.0, 1000.0] {
        let result = apply_discount(&record, &item(price)).unwrap();
        assert_eq!(result.final_price.minor(), 1499);
    }
}

#[test]
fn buy_two_get_one_is_33_point_3_percent() {
    let record = discount(json!({
        "discountType": "buy_x_get_y",
        "buyQuantity": 2,
        "getQuantity": 1,
        "getProductType": "same_product"
    }));
    let result = apply_discount(&record, &item(10.0)).unwrap();
    assert_eq!(result.effective_percent, Some(33.3));
}

#[test]
fn invalid_discounts_are_rejected() {
    for pct in [0, 150] {
        let record = discount(json!({ "discountType": "percentage", "percentage": pct }));
        assert_eq!(validate_discount(&record).len(), 1);
        assert!(apply_discount(&record, &item(10.0)).is_err());
    }

    let record = discount(json!({
        "discountType": "percentage",
        "percentage": 10,
        "applicationScope": "selected_products",
        "selectedProductIds": []
    }));
    let errors = validate_discount(&record);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field(), "selectedProductIds");

    let record = discount(json!({ "discountType": "mystery", "percentage": 10 }));
    assert_eq!(validate_discount(&record)[0].field(), "discountType");
}

#[test]
fn valid_discounts_always_apply() {
    let records = [
        json!({ "discountType": "percentage", "percentage": 7.5 }),
        json!({ "discountType": "fixed_amount", "fixedAmount": 0.01 }),
        json!({
            "discountType": "buy_x_get_y",
            "buyQuantity": 3,
            "getQuantity": 2,
            "getProductType": "different_product",
            "getProductId": "p-2",
            "applicationScope": "specific_category",
            "categoryId": "cat-1"
        }),
    ];
    for fields in records {
        let record = discount(fields);
        assert!(validate_discount(&record).is_empty());
        for price in [0.0, 0.01, 19.99, 5000.0] {
            assert!(apply_discount(&record, &item(price)).is_ok());
        }
    }
}

#[test]
fn monthly_day_31_clamps_every_short_month() {
    let spec = RecurrenceSpec::new(1, RecurrenceRule::Monthly { day_of_month: 31 });
    let dates = generate_occurrences(&spec, d(2024, 1, 1), d(2024, 12, 31)).unwrap();

    assert_eq!(dates.len(), 12);
    assert_eq!(&dates[..3], &[d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31)]);
    for date in &dates {
        assert_eq!(date.succ_opt().unwrap().day(), 1, "{date} is not a month end");
    }
}

#[test]
fn weekly_every_other_monday_starting_wednesday() {
    let spec = RecurrenceSpec::new(
        2,
        RecurrenceRule::Weekly {
            day_of_week: Weekday::Mon,
        },
    );
    let wednesday = d(2025, 3, 5);
    let dates = generate_occurrences(&spec, wednesday, d(2025, 6, 30)).unwrap();

    assert_eq!(dates[0], d(2025, 3, 10));
    assert!(dates.iter().all(|date| date.weekday() == Weekday::Mon));
    assert!(dates.windows(2).all(|w| (w[1] - w[0]).num_days() == 14));
    assert_eq!(
        dates,
        generate_occurrences(&spec, wednesday, d(2025, 6, 30)).unwrap()
    );
}

#[test]
fn recurring_expense_from_json_to_dates() {
    let record: ExpenseRecord = serde_json::from_value(json!({
        "id": "e-7",
        "expenseId": "EXP2501042",
        "vendorName": "Warehouse Landlord",
        "category": "Rent",
        "amount": 25000,
        "currency": "CZK",
        "date": "2025-01-01",
        "paymentMethod": "bank_transfer",
        "status": "paid",
        "isRecurring": true,
        "recurringType": "yearly",
        "recurringInterval": 1,
        "recurringMonth": 2,
        "recurringDay": 29,
        "recurringStartDate": "2025-01-01",
        "recurringEndDate": "2028-12-31"
    }))
    .unwrap();

    assert!(validate_expense(&record).is_empty());
    let spec = RecurrenceSpec::from_expense(&record).unwrap().unwrap();
    let dates = generate_occurrences(&spec, d(2000, 1, 1), d(2100, 1, 1)).unwrap();
    assert_eq!(
        dates,
        vec![d(2025, 2, 28), d(2026, 2, 28), d(2027, 2, 28), d(2028, 2, 29)]
    );
}
