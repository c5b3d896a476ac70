//! Product tree published by the upstream scheduler for one mall.
//!
//! Stored wholesale as the channel snapshot. Missing fields default, so a
//! partial upload still caches.

use serde::{Deserialize, Serialize};

use super::ViewCountMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductTree {
    pub mall_id: i64,
    pub mall_name: String,
    pub shop_list: Vec<ShopEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopEntry {
    pub shop_id: i64,
    pub shop_name: String,
    pub shop_contact: String,
    pub shop_address_details: String,
    pub product: Vec<ProductEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductEntry {
    pub product_id: i64,
    pub product_name: String,
    pub product_price: i64,
    pub product_unit: String,
    pub product_image_url: String,
    pub product_view_count: i64,
    pub major_category: String,
    pub sub_category: String,
}

impl ProductTree {
    /// Copy of the tree with every product's count replaced by the live
    /// counter. Products without a counter show zero.
    pub fn with_view_counts(&self, counts: &ViewCountMap) -> ProductTree {
        let mut merged = self.clone();
        for product in merged.products_mut() {
            product.product_view_count = counts.get(&product.product_id).copied().unwrap_or(0);
        }
        merged
    }

    pub fn products(&self) -> impl Iterator<Item = &ProductEntry> {
        self.shop_list.iter().flat_map(|shop| shop.product.iter())
    }

    fn products_mut(&mut self) -> impl Iterator<Item = &mut ProductEntry> {
        self.shop_list.iter_mut().flat_map(|shop| shop.product.iter_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> ProductTree {
        ProductTree {
            mall_id: 1,
            mall_name: "apm".into(),
            shop_list: vec![ShopEntry {
                shop_id: 10,
                shop_name: "Blue".into(),
                product: vec![
                    ProductEntry {
                        product_id: 42,
                        product_view_count: 99,
                        ..Default::default()
                    },
                    ProductEntry {
                        product_id: 43,
                        product_view_count: 5,
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn merge_overwrites_counts_and_defaults_to_zero() {
        let counts: ViewCountMap = [(42, 7)].into_iter().collect();
        let merged = tree().with_view_counts(&counts);
        let counts: Vec<i64> = merged.products().map(|p| p.product_view_count).collect();
        assert_eq!(counts, vec![7, 0]);
    }

    #[test]
    fn merge_leaves_source_untouched() {
        let original = tree();
        let _ = original.with_view_counts(&ViewCountMap::new());
        assert_eq!(original, tree());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let parsed: ProductTree =
            serde_json::from_str(r#"{"mall_name":"dong","shop_list":[{"shop_id":3}]}"#).unwrap();
        assert_eq!(parsed.mall_name, "dong");
        assert!(parsed.shop_list[0].product.is_empty());
    }
}
