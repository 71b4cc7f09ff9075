use harvest_core::{
    build_record, CardFields, ExtractionSkip, MandatoryField, Requirement, FIELD_RULES,
    PRICE_UNKNOWN,
};
use url::Url;

fn base() -> Url {
    Url::parse("https://shop.example.com/cat/food/").unwrap()
}

fn full_fields() -> CardFields {
    CardFields {
        name: Some("Tasty Kibble 2kg".to_string()),
        link: Some("/products/tasty-kibble".to_string()),
        review_count: Some(42),
        rating: Some(4.5),
        price: Some("$19.99".to_string()),
    }
}

#[test]
fn complete_card_builds_a_record_with_absolute_link() {
    let record = build_record("Cat Dry Food", &base(), full_fields()).unwrap();
    assert_eq!(record.category, "Cat Dry Food");
    assert_eq!(record.name, "Tasty Kibble 2kg");
    assert_eq!(record.link, "https://shop.example.com/products/tasty-kibble");
    assert_eq!(record.review_count, 42);
    assert_eq!(record.rating, Some(4.5));
    assert_eq!(record.price, "$19.99");
}

#[test]
fn missing_link_skips_the_card() {
    let fields = CardFields {
        link: None,
        ..full_fields()
    };
    assert_eq!(
        build_record("Cat Dry Food", &base(), fields),
        Err(ExtractionSkip {
            missing: MandatoryField::Link
        })
    );
}

#[test]
fn missing_name_skips_the_card() {
    let fields = CardFields {
        name: Some("   ".to_string()),
        ..full_fields()
    };
    assert_eq!(
        build_record("Cat Dry Food", &base(), fields),
        Err(ExtractionSkip {
            missing: MandatoryField::Name
        })
    );
}

#[test]
fn missing_optionals_default_instead_of_skipping() {
    let fields = CardFields {
        review_count: None,
        rating: None,
        price: None,
        ..full_fields()
    };
    let record = build_record("Cat Toys", &base(), fields).unwrap();
    assert_eq!(record.review_count, 0);
    assert_eq!(record.rating, None);
    assert_eq!(record.price, PRICE_UNKNOWN);
}

#[test]
fn zero_rating_is_kept_when_markup_reported_it() {
    let fields = CardFields {
        rating: Some(0.0),
        ..full_fields()
    };
    let record = build_record("Cat Toys", &base(), fields).unwrap();
    assert_eq!(record.rating, Some(0.0));
}

#[test]
fn out_of_range_rating_is_treated_as_absent() {
    let fields = CardFields {
        rating: Some(7.5),
        ..full_fields()
    };
    let record = build_record("Cat Toys", &base(), fields).unwrap();
    assert_eq!(record.rating, None);
}

#[test]
fn absolute_href_passes_through_unchanged() {
    let fields = CardFields {
        link: Some("https://other.example.net/p/1".to_string()),
        ..full_fields()
    };
    let record = build_record("Dog Toys", &base(), fields).unwrap();
    assert_eq!(record.link, "https://other.example.net/p/1");
}

#[test]
fn fragment_only_href_counts_as_missing_link() {
    let fields = CardFields {
        link: Some("#reviews".to_string()),
        ..full_fields()
    };
    assert!(build_record("Dog Toys", &base(), fields).is_err());
}

#[test]
fn policy_table_marks_exactly_name_and_link_mandatory() {
    let mandatory: Vec<&str> = FIELD_RULES
        .iter()
        .filter(|(_, req)| *req == Requirement::Mandatory)
        .map(|(field, _)| *field)
        .collect();
    assert_eq!(mandatory, vec!["name", "link"]);
    assert_eq!(FIELD_RULES.len(), 5);
}
