//! Catalog fixtures shared by the unit tests.

use crate::catalog::Catalog;
use crate::types::{CatalogDocument, VariantId};

pub const CASE_A: VariantId = 1;
pub const CASE_B: VariantId = 2;
pub const PCB_X: VariantId = 11;
pub const PCB_Y: VariantId = 12;

/// Two required components and one rule:
/// case A ($100), case B ($150, sold out), pcb X ($50), pcb Y ($80),
/// with case B incompatible with pcb Y.
pub const SCENARIO_JSON: &str = r#"{
    "parent_product_title": "Nova 75",
    "components": [
        {
            "handle": "case",
            "title": "Nova 75 Case",
            "required": true,
            "layer_index": 2,
            "featured_image": "case.png",
            "options": [{ "name": "Material" }, { "name": "Color" }],
            "variants": [
                { "id": 1, "title": "Polycarbonate / Clear", "price": 10000, "available": true,
                  "featured_image": "case-clear.png", "images": ["case-clear.png"] },
                { "id": 2, "title": "Aluminium / Silver", "price": 15000, "available": false,
                  "images": ["case-silver.png"] }
            ]
        },
        {
            "handle": "pcb",
            "title": "Nova 75 PCB",
            "required": true,
            "layer_index": 1,
            "featured_image": "pcb.png",
            "options": [{ "name": "Mounting" }],
            "variants": [
                { "id": 11, "title": "Solder", "price": 5000, "available": true },
                { "id": 12, "title": "Hotswap", "price": 8000, "available": true,
                  "featured_image": "pcb-hotswap.png" }
            ]
        }
    ],
    "conflicts": [
        {
            "component1": "case",
            "component1_variants": [2],
            "component2": "pcb",
            "component2_variants": ["12"],
            "disclaimer": "Aluminium cases only fit solder PCBs"
        }
    ]
}"#;

pub fn scenario_document() -> CatalogDocument {
    serde_json::from_str(SCENARIO_JSON).unwrap()
}

pub fn scenario_catalog() -> Catalog {
    Catalog::from_json(SCENARIO_JSON).unwrap()
}

/// A two-option PCB covering every layout/mounting combination.
pub fn pcb_matrix_catalog() -> Catalog {
    Catalog::from_json(
        r#"{
            "components": [{
                "handle": "pcb",
                "title": "PCB",
                "required": true,
                "options": [{ "name": "Layout" }, { "name": "Mounting" }],
                "variants": [
                    { "id": 31, "title": "ANSI / Hotswap", "price": 5000, "available": true },
                    { "id": 32, "title": "ISO / Hotswap", "price": 5500, "available": false },
                    { "id": 33, "title": "ANSI / Solder", "price": 4500, "available": true },
                    { "id": 34, "title": "ISO / Solder", "price": 5000, "available": true }
                ]
            }]
        }"#,
    )
    .unwrap()
}

/// A single optional component with two colorways.
pub fn keycaps_catalog() -> Catalog {
    Catalog::from_json(
        r#"{
            "components": [{
                "handle": "keycaps",
                "title": "Keycaps",
                "options": [{ "name": "Colorway" }],
                "variants": [
                    { "id": 21, "title": "Ocean", "price": 4999, "available": true },
                    { "id": 22, "title": "Sunset", "price": 5999, "available": true }
                ]
            }]
        }"#,
    )
    .unwrap()
}
