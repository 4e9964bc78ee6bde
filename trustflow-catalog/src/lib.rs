pub mod product;
pub mod repository;
pub mod seller;
pub mod service;

pub use product::{Product, ProductStatus};
pub use repository::{ProductRepository, SellerRepository};
pub use seller::{SellerAccount, UserTier};
pub use service::ListingService;
