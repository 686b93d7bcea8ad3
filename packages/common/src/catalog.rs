//! Catalog vocabulary for garment cut-outs.
//!
//! Every categorical attribute of a cut-out is a closed set. The wire value
//! (`as_str`) is what gets stored, serialized and fed into key derivation;
//! the label is what forms and tables show to operators.
//!
//! When the `sea-orm` feature is enabled, the enums can be used directly as
//! SeaORM entity columns.

#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Delimiter placed between the normalized identity components of a key.
pub const KEY_DELIMITER: &str = "-";

/// Error when parsing a value outside one of the closed catalog sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} '{invalid}'. Valid values: {valid}")]
pub struct ParseCatalogError {
    kind: &'static str,
    invalid: String,
    valid: String,
}

impl ParseCatalogError {
    fn new<'a>(kind: &'static str, invalid: &str, valid: impl Iterator<Item = &'a str>) -> Self {
        Self {
            kind,
            invalid: invalid.to_string(),
            valid: valid.collect::<Vec<_>>().join(", "),
        }
    }

    /// Name of the attribute that failed to parse (e.g. `color`).
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

macro_rules! catalog_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal, $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
        #[cfg_attr(
            feature = "sea-orm",
            derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
            sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
        )]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $value)]
                #[cfg_attr(feature = "sea-orm", sea_orm(string_value = $value))]
                $variant,
            )+
        }

        impl $name {
            /// All values of this set, in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            /// Stored and serialized value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }

            /// Human-readable value for display.
            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseCatalogError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(ParseCatalogError::new(
                        $kind,
                        s,
                        Self::ALL.iter().map(|v| v.as_str()),
                    )),
                }
            }
        }
    };
}

catalog_enum! {
    /// Product line a cut-out belongs to.
    ProductModel as "product_model" {
        Bone => "BONE", "Bone",
        Trucker => "TRUCKER", "Trucker",
        Bucket => "BUCKET", "Bucket",
        Visor => "VISOR", "Visor",
        DadHat => "DAD_HAT", "Dad Hat",
    }
}

catalog_enum! {
    /// Garment part the image depicts.
    CutType as "cut_type" {
        Front => "FRONT", "Front",
        Back => "BACK", "Back",
        Side => "SIDE", "Side",
        Brim => "BRIM", "Brim",
        TopButton => "TOP_BUTTON", "Top Button",
        Strap => "STRAP", "Strap",
        Mesh => "MESH", "Mesh",
    }
}

catalog_enum! {
    /// Where the part sits on the finished product.
    Position as "position" {
        Front => "FRONT", "Front",
        Back => "BACK", "Back",
        Left => "LEFT", "Left",
        Right => "RIGHT", "Right",
        Top => "TOP", "Top",
        UnderBrim => "UNDER_BRIM", "Under Brim",
    }
}

catalog_enum! {
    Fabric as "fabric" {
        Cotton => "COTTON", "Cotton",
        Denim => "DENIM", "Denim",
        Linen => "LINEN", "Linen",
        Nylon => "NYLON", "Nylon",
        Polyester => "POLYESTER", "Polyester",
        Suede => "SUEDE", "Suede",
        Corduroy => "CORDUROY", "Corduroy",
    }
}

catalog_enum! {
    Color as "color" {
        Red => "RED", "Red",
        Blue => "BLUE", "Blue",
        NavyBlue => "NAVY_BLUE", "Navy Blue",
        Black => "BLACK", "Black",
        White => "WHITE", "White",
        Green => "GREEN", "Green",
        Yellow => "YELLOW", "Yellow",
        Orange => "ORANGE", "Orange",
        Pink => "PINK", "Pink",
        Gray => "GRAY", "Gray",
        Beige => "BEIGE", "Beige",
        Brown => "BROWN", "Brown",
    }
}

catalog_enum! {
    /// Whether the cut-out is offered in the catalog.
    #[derive(Default)]
    CutOutStatus as "status" {
        #[default]
        Active => "ACTIVE", "Active",
        Inactive => "INACTIVE", "Inactive",
    }
}

/// Derive the composite asset key from the four identity components.
///
/// Each run of whitespace inside a component becomes a single `_`, the
/// components are joined with [`KEY_DELIMITER`] in the order model, cut
/// type, fabric, color, and the result is lowercased.
pub fn derive_key(product_model: &str, cut_type: &str, fabric: &str, color: &str) -> String {
    [product_model, cut_type, fabric, color]
        .iter()
        .map(|component| collapse_whitespace(component))
        .collect::<Vec<_>>()
        .join(KEY_DELIMITER)
        .to_lowercase()
}

fn collapse_whitespace(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut in_whitespace = false;
    for c in component.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

/// One of the four attributes that together determine a cut-out's key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityField {
    ProductModel,
    CutType,
    Fabric,
    Color,
}

impl IdentityField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProductModel => "product_model",
            Self::CutType => "cut_type",
            Self::Fabric => "fabric",
            Self::Color => "color",
        }
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identity tuple of a cut-out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdentityFields {
    pub product_model: ProductModel,
    pub cut_type: CutType,
    pub fabric: Fabric,
    pub color: Color,
}

impl IdentityFields {
    /// Overlay the given values on `self`, keeping current values where
    /// nothing was provided.
    pub fn merged(
        &self,
        product_model: Option<ProductModel>,
        cut_type: Option<CutType>,
        fabric: Option<Fabric>,
        color: Option<Color>,
    ) -> Self {
        Self {
            product_model: product_model.unwrap_or(self.product_model),
            cut_type: cut_type.unwrap_or(self.cut_type),
            fabric: fabric.unwrap_or(self.fabric),
            color: color.unwrap_or(self.color),
        }
    }

    /// Fields whose value differs between `self` and `other`.
    pub fn changed_fields(&self, other: &Self) -> Vec<IdentityField> {
        let mut changed = Vec::new();
        if self.product_model != other.product_model {
            changed.push(IdentityField::ProductModel);
        }
        if self.cut_type != other.cut_type {
            changed.push(IdentityField::CutType);
        }
        if self.fabric != other.fabric {
            changed.push(IdentityField::Fabric);
        }
        if self.color != other.color {
            changed.push(IdentityField::Color);
        }
        changed
    }

    /// The asset key these identity values map to.
    pub fn key(&self) -> String {
        derive_key(
            self.product_model.as_str(),
            self.cut_type.as_str(),
            self.fabric.as_str(),
            self.color.as_str(),
        )
    }
}
