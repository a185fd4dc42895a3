//! # Catalog Store
//!
//! Holds the product list. Stock is read here by the cart before every
//! mutation and decremented here at checkout.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{NewProduct, Product};
use crate::validation::{validate_new_product, validate_search_query};

/// The product catalog.
///
/// ## Invariants
/// - Product ids are unique
/// - Barcodes are unique
/// - Stock is never negative
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Builds a catalog from a loaded product list.
    pub fn from_products(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    /// All products, in insertion order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Looks up a product by id.
    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Looks up a product by id, failing with `ProductNotFound`.
    pub fn require(&self, product_id: &str) -> CoreResult<&Product> {
        self.get(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))
    }

    /// Exact barcode match.
    pub fn find_by_barcode(&self, barcode: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.barcode == barcode)
    }

    /// Searches by name (case-insensitive) or barcode substring.
    ///
    /// An empty query returns the whole catalog.
    pub fn search(&self, query: &str) -> CoreResult<Vec<&Product>> {
        let query = validate_search_query(query)?;
        if query.is_empty() {
            return Ok(self.products.iter().collect());
        }

        let needle = query.to_lowercase();
        Ok(self
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle) || p.barcode.contains(&query))
            .collect())
    }

    /// Products at or below their reorder threshold.
    pub fn low_stock(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.is_low_stock()).collect()
    }

    /// Validates and inserts a new product with a fresh UUID.
    pub fn add_product(&mut self, new_product: NewProduct) -> CoreResult<&Product> {
        validate_new_product(&new_product)?;
        self.ensure_barcode_free(&new_product.barcode, None)?;

        let product = new_product.into_product(Uuid::new_v4().to_string());
        debug!(product_id = %product.id, barcode = %product.barcode, "Adding product");

        self.products.push(product);
        let index = self.products.len() - 1;
        Ok(&self.products[index])
    }

    /// Replaces an existing product after validating it.
    pub fn update_product(&mut self, product: Product) -> CoreResult<()> {
        let form = NewProduct {
            name: product.name.clone(),
            barcode: product.barcode.clone(),
            price_paise: product.price_paise,
            stock: product.stock,
            category: product.category.clone(),
            gst_rate_bps: product.gst_rate_bps,
            min_stock: product.min_stock,
        };
        validate_new_product(&form)?;
        self.ensure_barcode_free(&product.barcode, Some(&product.id))?;

        let slot = self
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| CoreError::ProductNotFound(product.id.clone()))?;

        debug!(product_id = %product.id, stock = product.stock, "Updating product");
        *slot = product;
        Ok(())
    }

    /// Removes `quantity` units from stock.
    ///
    /// Fails with `StockChanged` rather than going negative.
    pub fn decrement_stock(&mut self, product_id: &str, quantity: i64) -> CoreResult<i64> {
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        if !product.can_sell(quantity) {
            return Err(CoreError::StockChanged {
                product_id: product.id.clone(),
                name: product.name.clone(),
                available: product.stock,
                requested: quantity,
            });
        }

        product.stock -= quantity;
        debug!(product_id = %product_id, sold = quantity, stock = product.stock, "Stock decremented");
        Ok(product.stock)
    }

    fn ensure_barcode_free(&self, barcode: &str, except_id: Option<&str>) -> CoreResult<()> {
        let taken = self
            .products
            .iter()
            .any(|p| p.barcode == barcode && Some(p.id.as_str()) != except_id);

        if taken {
            return Err(ValidationError::Duplicate {
                field: "barcode".to_string(),
                value: barcode.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn product(id: &str, price_paise: i64, stock: i64, gst_rate_bps: u32) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            barcode: format!("89010308754{:0>2}", id),
            price_paise,
            stock,
            category: "Groceries".to_string(),
            gst_rate_bps,
            min_stock: 5,
        }
    }

    fn new_product(barcode: &str) -> NewProduct {
        NewProduct {
            name: "Soap - Bathing Bar".to_string(),
            barcode: barcode.to_string(),
            price_paise: 2500,
            stock: 60,
            category: "Personal Care".to_string(),
            gst_rate_bps: 1800,
            min_stock: 15,
        }
    }

    #[test]
    fn test_add_product_assigns_id() {
        let mut catalog = Catalog::new();
        let id = catalog.add_product(new_product("8901030875427")).unwrap().id.clone();

        assert!(!id.is_empty());
        assert_eq!(catalog.get(&id).unwrap().price_paise, 2500);
    }

    #[test]
    fn test_add_product_rejects_duplicate_barcode() {
        let mut catalog = Catalog::new();
        catalog.add_product(new_product("8901030875427")).unwrap();

        let err = catalog.add_product(new_product("8901030875427")).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Duplicate { .. })));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_update_product_keeps_own_barcode() {
        let mut catalog = Catalog::from_products(vec![product("1", 12000, 50, 500)]);
        let mut edited = catalog.get("1").unwrap().clone();
        edited.price_paise = 12500;

        catalog.update_product(edited).unwrap();
        assert_eq!(catalog.get("1").unwrap().price_paise, 12500);
    }

    #[test]
    fn test_update_missing_product() {
        let mut catalog = Catalog::new();
        let err = catalog.update_product(product("9", 100, 1, 0)).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(_)));
    }

    #[test]
    fn test_search_by_name_and_barcode() {
        let mut rice = product("1", 12000, 50, 500);
        rice.name = "Rice - Basmati 1kg".to_string();
        let mut milk = product("2", 6500, 30, 500);
        milk.name = "Milk - Full Cream 1L".to_string();
        let catalog = Catalog::from_products(vec![rice, milk]);

        assert_eq!(catalog.search("RICE").unwrap().len(), 1);
        assert_eq!(catalog.search("8901030875402").unwrap()[0].id, "2");
        assert_eq!(catalog.search("").unwrap().len(), 2);
        assert!(catalog.search("paneer").unwrap().is_empty());
    }

    #[test]
    fn test_low_stock() {
        let catalog = Catalog::from_products(vec![
            product("1", 100, 5, 0),
            product("2", 100, 6, 0),
            product("3", 100, 0, 0),
        ]);
        let low: Vec<&str> = catalog.low_stock().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(low, vec!["1", "3"]);
    }

    #[test]
    fn test_decrement_stock_never_negative() {
        let mut catalog = Catalog::from_products(vec![product("1", 100, 2, 0)]);

        assert_eq!(catalog.decrement_stock("1", 2).unwrap(), 0);
        let err = catalog.decrement_stock("1", 1).unwrap_err();
        assert!(matches!(err, CoreError::StockChanged { available: 0, requested: 1, .. }));
        assert_eq!(catalog.get("1").unwrap().stock, 0);
    }

    #[test]
    fn test_catalog_serializes_as_product_list() {
        let catalog = Catalog::from_products(vec![product("1", 100, 2, 0)]);
        let json = serde_json::to_value(&catalog).unwrap();
        assert!(json.is_array());
    }
}
