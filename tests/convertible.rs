use unitcalc::LiteralParser;
use unitcalc::system::Convertible;
use unitcalc::systems::{css_system, length_system};

fn css(input: &str) -> Convertible {
    LiteralParser::new(&css_system()).parse(input).unwrap()
}

fn len(input: &str) -> Convertible {
    LiteralParser::new(&length_system()).parse(input).unwrap()
}

#[test]
fn relative_units_resolve_against_the_constants() {
    let px = |value: &Convertible| value.get("px").unwrap().to_string();

    assert_eq!(px(&css("4rem").with([("rootFontSize", 16.0)])), "64px");
    assert_eq!(px(&css("-4rem").with([("rootFontSize", 16.0)])), "-64px");
    assert_eq!(px(&css("0.5rem").with([("rootFontSize", 16.0)])), "8px");
    assert_eq!(px(&css("0.5rem").with([("rootFontSize", 30.0)])), "15px");
    assert_eq!(
        px(&css("4em").with([("rootFontSize", 10.0), ("fontSize", 18.0)])),
        "72px"
    );
    assert_eq!(px(&css("50%").with([("width", 100.0)])), "50px");
    assert_eq!(px(&css("50vw").with([("viewWidth", 1920.0)])), "960px");
    assert_eq!(
        css("60vw")
            .with([("viewHeight", 1920.0)])
            .get("px")
            .unwrap()
            .get("rem")
            .unwrap()
            .to_string(),
        "64rem"
    );
}

#[test]
fn conversions_survive_round_trips() {
    let value = css("32px").with([("rootFontSize", 16.0)]);
    let round_trip = value
        .get("rem")
        .unwrap()
        .get("px")
        .unwrap()
        .get("rem")
        .unwrap()
        .get("px")
        .unwrap()
        .get("rem")
        .unwrap();
    assert_eq!(round_trip.to_string(), "2rem");
}

#[test]
fn a_bare_number_gets_the_base_unit() {
    let value = css("32").with([("rootFontSize", 16.0)]);
    assert_eq!(value.get("rem").unwrap().to_string(), "2rem");
}

#[test]
fn a_missing_zero_prefix_is_accepted() {
    assert_eq!(css(".5").get("px").unwrap().to_string(), "0.5px");
    assert_eq!(css(".5px").get("px").unwrap().to_string(), "0.5px");
}

#[test]
fn units_without_a_direct_conversion_route_through_the_base() {
    let value = css("50%").with([("width", 100.0), ("viewWidth", 200.0)]);
    assert_eq!(value.get("vw").unwrap().to_string(), "25vw");

    let value = css("2em").with([("rootFontSize", 16.0), ("fontSize", 32.0)]);
    assert_eq!(value.get("rem").unwrap().to_string(), "4rem");
}

#[test]
fn systems_bridge_through_a_shared_unit() {
    let bridged = css("50%")
        .with([("width", 37.795276)])
        .to_system(&length_system(), "cm")
        .unwrap();
    assert_eq!(bridged.get("km").unwrap().to_string(), "0.000005km");

    let bridged = len("10m").to_system(&css_system(), "cm").unwrap();
    assert_eq!(bridged.get("px").unwrap().to_string(), "37795.276px");

    let bridged = len("12km").to_system(&css_system(), "cm").unwrap();
    assert_eq!(
        bridged
            .with([("pixelRatio", 2.0)])
            .get("px")
            .unwrap()
            .to_string(),
        "90708662.4px"
    );
}

#[test]
fn bridging_through_an_unshared_unit_fails() {
    assert!(css("10px").to_system(&length_system(), "px").is_err());
}
