//! The stock unit systems.
//!
//! Each function builds a fresh [`System`]. Declaration order of the units
//! is significant: the parser's suffix scan takes the first declared match,
//! which is why `mm` precedes `m` and `mmol` precedes `mol`.

use crate::system::System;

/// Lengths, base unit `m`.
pub fn length_system() -> System {
    System::builder("m")
        .unit("km", |v, _| v * 1000.0, |v, _| v / 1000.0)
        .unit("cm", |v, _| v / 100.0, |v, _| v * 100.0)
        .unit("mm", |v, _| v / 1000.0, |v, _| v * 1000.0)
        .unit("m", |v, _| v, |v, _| v)
        .build()
}

/// Durations, base unit `s`.
pub fn time_system() -> System {
    System::builder("s")
        .unit("w", |v, _| v * 604800.0, |v, _| v / 604800.0)
        .unit("d", |v, _| v * 86400.0, |v, _| v / 86400.0)
        .unit("h", |v, _| v * 3600.0, |v, _| v / 3600.0)
        .unit("min", |v, _| v * 60.0, |v, _| v / 60.0)
        .unit("ms", |v, _| v / 1000.0, |v, _| v * 1000.0)
        .unit("s", |v, _| v, |v, _| v)
        .build()
}

/// Masses, base unit `kg`.
pub fn mass_system() -> System {
    System::builder("kg")
        .unit("t", |v, _| v * 1000.0, |v, _| v / 1000.0)
        .unit("mg", |v, _| v / 1_000_000.0, |v, _| v * 1_000_000.0)
        .unit("g", |v, _| v / 1000.0, |v, _| v * 1000.0)
        .unit("kg", |v, _| v, |v, _| v)
        .build()
}

/// Temperatures, base unit `K`. Celsius and Fahrenheit are affine, which the
/// conversion signature handles the same as any scaling.
pub fn temperature_system() -> System {
    System::builder("K")
        .unit("°C", |v, _| v + 273.15, |v, _| v - 273.15)
        .unit(
            "°F",
            |v, _| (v - 32.0) * 5.0 / 9.0 + 273.15,
            |v, _| (v - 273.15) * 9.0 / 5.0 + 32.0,
        )
        .unit("K", |v, _| v, |v, _| v)
        .build()
}

/// Amounts of substance, base unit `mol`.
pub fn amount_of_substance_system() -> System {
    System::builder("mol")
        .unit("mmol", |v, _| v / 1000.0, |v, _| v * 1000.0)
        .unit("mol", |v, _| v, |v, _| v)
        .build()
}

/// Electric currents, base unit `A`.
pub fn electric_current_system() -> System {
    System::builder("A")
        .unit("mA", |v, _| v / 1000.0, |v, _| v * 1000.0)
        .unit("A", |v, _| v, |v, _| v)
        .build()
}

/// Luminous intensities, base unit `cd`. Single-unit system.
pub fn luminous_intensity_system() -> System {
    System::builder("cd").unit("cd", |v, _| v, |v, _| v).build()
}

/// CSS lengths, base unit `px`.
///
/// Relative units read their context from the constants: viewport dimensions
/// for `vw`/`vh`/`vmin`/`vmax`, font sizes for `rem`/`em`/`ch`, the
/// container box for `%`/`h%`, and the device pixel ratio for the physical
/// units. The stock constants describe a 1920x1080 viewport with an 18px
/// root font; real callers overlay their own via [`css_system_with`] or
/// `Convertible::with`.
pub fn css_system() -> System {
    System::builder("px")
        .constant("rootFontSize", 18.0)
        .constant("fontSize", 18.0)
        .constant("width", 0.0)
        .constant("height", 0.0)
        .constant("viewWidth", 1920.0)
        .constant("viewHeight", 1080.0)
        .constant("pixelRatio", 1.0)
        .constant("zeroWidth", 16.0)
        .unit("px", |v, _| v, |v, _| v)
        .unit(
            "vw",
            |v, c| (v / 100.0) * c.get("viewWidth"),
            |v, c| (v / c.get("viewWidth")) * 100.0,
        )
        .unit(
            "vh",
            |v, c| (v / 100.0) * c.get("viewHeight"),
            |v, c| (v / c.get("viewHeight")) * 100.0,
        )
        .unit(
            "vmin",
            |v, c| ((v / 100.0) * c.get("viewWidth").min(c.get("viewHeight"))) / (1.0 / 100.0),
            |v, c| ((v / c.get("viewWidth").min(c.get("viewHeight"))) * 100.0) / (1.0 / 100.0),
        )
        .unit(
            "vmax",
            |v, c| ((v / 100.0) * c.get("viewWidth").max(c.get("viewHeight"))) / (1.0 / 100.0),
            |v, c| ((v / c.get("viewWidth").max(c.get("viewHeight"))) * 100.0) / (1.0 / 100.0),
        )
        .unit(
            "rem",
            |v, c| c.get("rootFontSize") * v,
            |v, c| v / c.get("rootFontSize"),
        )
        .unit(
            "em",
            |v, c| c.get("fontSize") * v,
            |v, c| v / c.get("fontSize"),
        )
        .unit(
            "%",
            |v, c| (v / 100.0) * c.get("width"),
            |v, c| (v / c.get("width")) * 100.0,
        )
        .unit(
            "h%",
            |v, c| (v / 100.0) * c.get("height"),
            |v, c| (v / c.get("height")) * 100.0,
        )
        .unit(
            "mm",
            |v, c| v * 3.7795276 * c.get("pixelRatio"),
            |v, c| v / c.get("pixelRatio") / 3.7795276,
        )
        .unit(
            "cm",
            |v, c| v * 37.795276 * c.get("pixelRatio"),
            |v, c| v / c.get("pixelRatio") / 37.795276,
        )
        .unit(
            "in",
            |v, c| v * 96.0 * c.get("pixelRatio"),
            |v, c| v / c.get("pixelRatio") / 96.0,
        )
        .unit(
            "pt",
            |v, c| v * 1.333333 * c.get("pixelRatio"),
            |v, c| v / c.get("pixelRatio") / 1.333333,
        )
        .unit(
            "pc",
            |v, c| v * 16.0 * c.get("pixelRatio"),
            |v, c| v / c.get("pixelRatio") / 16.0,
        )
        .unit(
            "ch",
            |v, c| c.get("zeroWidth") * v,
            |v, c| v / c.get("zeroWidth"),
        )
        .build()
}

/// A [`css_system`] with constants overlaid, for callers that know their
/// layout context up front.
pub fn css_system_with<K, I>(constants: I) -> System
where
    K: Into<String>,
    I: IntoIterator<Item = (K, f64)>,
{
    css_system().with_constants(constants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::Convertible;

    #[test]
    fn length_units_scan_longest_first() {
        let names: Vec<_> = length_system().unit_names().collect();
        assert_eq!(names, vec!["km", "cm", "mm", "m"]);
        // mm before m keeps the scan from stopping at the shorter suffix.
        assert!(
            names.iter().position(|n| *n == "mm") < names.iter().position(|n| *n == "m")
        );
    }

    #[test]
    fn substance_declares_mmol_before_mol() {
        let names: Vec<_> = amount_of_substance_system().unit_names().collect();
        assert_eq!(names, vec!["mmol", "mol"]);
    }

    #[test]
    fn length_round_numbers_stay_exact() {
        let value = Convertible::new(length_system(), 11800.0, "m");
        assert_eq!(value.get("cm").unwrap().to_string(), "1180000cm");
        assert_eq!(value.get("km").unwrap().to_string(), "11.8km");
    }

    #[test]
    fn time_weeks_to_days() {
        let value = Convertible::new(time_system(), 12.0, "w");
        assert_eq!(value.get("d").unwrap().to_string(), "84d");
    }

    #[test]
    fn mass_tonnes_through_grams() {
        let value = Convertible::new(mass_system(), 2.0, "t");
        assert_eq!(value.get("g").unwrap().value(), 2_000_000.0);
    }

    #[test]
    fn temperature_celsius_is_affine() {
        let value = Convertible::new(temperature_system(), 100.0, "°C");
        assert_eq!(value.get("K").unwrap().value(), 100.0 + 273.15);

        let freezing = Convertible::new(temperature_system(), 32.0, "°F");
        assert_eq!(freezing.get("K").unwrap().value(), 273.15);
    }

    #[test]
    fn css_rem_uses_the_root_font_size() {
        let value = Convertible::new(css_system(), 4.0, "rem");
        assert_eq!(value.get("px").unwrap().to_string(), "72px");

        let narrow = value.with([("rootFontSize", 16.0)]);
        assert_eq!(narrow.get("px").unwrap().to_string(), "64px");
    }

    #[test]
    fn css_percent_reads_the_container_width() {
        let system = css_system_with([("width", 100.0)]);
        let value = Convertible::new(system, 50.0, "%");
        assert_eq!(value.get("px").unwrap().to_string(), "50px");
    }

    #[test]
    fn css_viewport_units_scale_with_the_viewport() {
        let value = Convertible::new(css_system(), 50.0, "vw");
        assert_eq!(value.get("px").unwrap().value(), 960.0);

        let tall = Convertible::new(css_system(), 50.0, "vh");
        assert_eq!(tall.get("px").unwrap().value(), 540.0);
    }

    #[test]
    fn css_physical_units_honor_the_pixel_ratio() {
        let value = Convertible::new(css_system(), 10.0, "cm");
        assert_eq!(value.get("px").unwrap().value(), 10.0 * 37.795276 * 1.0);

        let retina = value.with([("pixelRatio", 2.0)]);
        assert_eq!(retina.get("px").unwrap().value(), 10.0 * 37.795276 * 2.0);
    }
}
