//! Information about this shell project.

/// The formal name of this product.
pub const PRODUCT_NAME: &str = "nacre";

const PRODUCT_HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
const PRODUCT_REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// The URI to display as the product's homepage.
#[allow(clippy::const_is_empty)]
pub const PRODUCT_DISPLAY_URI: &str = if !PRODUCT_HOMEPAGE.is_empty() {
    PRODUCT_HOMEPAGE
} else {
    PRODUCT_REPO
};

/// The version of the product, in string form.
pub const PRODUCT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) fn get_product_display_str() -> String {
    std::format!("{PRODUCT_NAME} version {PRODUCT_VERSION} - {PRODUCT_DISPLAY_URI}")
}
