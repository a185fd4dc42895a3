//! # Customer Directory
//!
//! Loaded list of customers. Read-only from the cart's point of view.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Customer;
use crate::validation::validate_search_query;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerDirectory {
    customers: Vec<Customer>,
}

impl CustomerDirectory {
    pub fn from_customers(customers: Vec<Customer>) -> Self {
        CustomerDirectory { customers }
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn get(&self, customer_id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == customer_id)
    }

    /// Looks up a customer by id, failing with `CustomerNotFound`.
    pub fn require(&self, customer_id: &str) -> CoreResult<&Customer> {
        self.get(customer_id)
            .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))
    }

    /// Matches name (case-insensitive) or phone substring.
    pub fn search(&self, query: &str) -> CoreResult<Vec<&Customer>> {
        let query = validate_search_query(query)?;
        if query.is_empty() {
            return Ok(self.customers.iter().collect());
        }

        let needle = query.to_lowercase();
        Ok(self
            .customers
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle) || c.phone.contains(&query))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> CustomerDirectory {
        CustomerDirectory::from_customers(vec![
            Customer {
                id: "1".to_string(),
                name: "Rajesh Kumar".to_string(),
                phone: "9876543210".to_string(),
                email: Some("rajesh@email.com".to_string()),
                address: None,
                loyalty_points: 150,
            },
            Customer {
                id: "3".to_string(),
                name: "Amit Patel".to_string(),
                phone: "9876543212".to_string(),
                email: None,
                address: None,
                loyalty_points: 200,
            },
        ])
    }

    #[test]
    fn test_search_by_name_or_phone() {
        let dir = directory();
        assert_eq!(dir.search("amit").unwrap()[0].id, "3");
        assert_eq!(dir.search("3210").unwrap()[0].id, "1");
        assert_eq!(dir.search("").unwrap().len(), 2);
    }

    #[test]
    fn test_require_missing() {
        assert!(matches!(
            directory().require("42"),
            Err(CoreError::CustomerNotFound(_))
        ));
    }

    #[test]
    fn test_loads_without_optional_fields() {
        let json = r#"[{"id":"9","name":"Walk-up","phone":"1"}]"#;
        let dir: CustomerDirectory = serde_json::from_str(json).unwrap();
        assert_eq!(dir.get("9").unwrap().loyalty_points, 0);
    }
}
