//! Tolerant decoding of loosely typed collaborator records.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Decodes every record that matches `T`, logging and dropping the rest.
///
/// Collaborators hand over records assembled from several stores; one bad
/// record must not hide the others from the rule compiler.
pub fn decode_records<T>(record_kind: &str, values: Vec<Value>) -> Vec<T>
where
    T: DeserializeOwned,
{
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(
                    record_kind,
                    index,
                    error = %error,
                    "skipping malformed record"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use lectern_domain::{Purchase, PurchaseStatus};
    use serde_json::json;

    use super::decode_records;

    #[test]
    fn malformed_records_are_dropped() {
        let purchases: Vec<Purchase> = decode_records(
            "purchase",
            vec![
                json!({ "status": "Valid", "productId": "product-1" }),
                json!({ "productId": "product-2" }),
                json!("not a purchase"),
                json!({ "status": "Restricted", "country": "IN" }),
            ],
        );

        assert_eq!(purchases.len(), 2);
        assert_eq!(purchases[0].status, PurchaseStatus::Valid);
        assert_eq!(purchases[1].status, PurchaseStatus::Restricted);
    }
}
