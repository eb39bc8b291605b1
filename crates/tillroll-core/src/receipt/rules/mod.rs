//! Rule-based stages of receipt normalization.

pub mod amounts;
pub mod items;
pub mod merchant;
pub mod noise;

pub use amounts::{clean_amount, parse_amount, ParsedAmount};
pub use items::{DiscardReason, LineItemNormalizer, LineOutcome};
pub use merchant::{CatalogEntry, Merchant, MerchantCatalog, MerchantResolver, MerchantSource};
pub use noise::NoiseFilter;
