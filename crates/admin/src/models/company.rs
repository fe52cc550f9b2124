//! Companies, the services they offer, and service reviews.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use taskmaster_core::{CompanyKey, Price, ReviewKey, ServiceKey};

use super::lenient;
use crate::db::Entity;

/// Text shown in place of an average when a service has no ratings.
pub const NO_RATINGS: &str = "No ratings";

/// A company (`companies/{id}`); its identity is the record key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
    pub services: BTreeMap<ServiceKey, Service>,
}

/// A service offered by a company (`companies/{c}/services/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Service {
    pub service_name: String,
    pub description: String,
    /// Free-text price as entered by the provider.
    #[serde(deserialize_with = "lenient::string")]
    pub price: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub duration: Option<String>,
    pub service_type: String,
    #[serde(deserialize_with = "lenient::string")]
    pub image_url: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub whatsapp: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub company_id: Option<String>,
    #[serde(deserialize_with = "lenient::epoch_millis")]
    pub created_at: Option<i64>,
    pub reviews: BTreeMap<ReviewKey, Review>,
}

/// A customer review of a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    #[serde(deserialize_with = "lenient::number")]
    pub rating: Option<f64>,
    pub review: String,
    #[serde(deserialize_with = "lenient::string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub user: Option<String>,
}

impl Service {
    /// Average rating to one decimal place, or [`NO_RATINGS`].
    ///
    /// Reviews without a numeric rating are not counted.
    #[must_use]
    pub fn average_rating(&self) -> String {
        let ratings: Vec<f64> = self.reviews.values().filter_map(|r| r.rating).collect();
        if ratings.is_empty() {
            return NO_RATINGS.to_string();
        }
        #[allow(clippy::cast_precision_loss)] // review counts are small
        let average = ratings.iter().sum::<f64>() / ratings.len() as f64;
        format!("{average:.1}")
    }

    /// Price formatted as currency when numeric, otherwise verbatim.
    #[must_use]
    pub fn price_display(&self) -> Option<String> {
        let raw = self.price.as_deref()?;
        Some(Price::parse_lenient(raw).map_or_else(|| raw.to_string(), |p| p.display()))
    }
}

impl Entity for Company {
    type Key = CompanyKey;
    const COLLECTION: &'static str = "companies";

    fn search_fields<'a>(&'a self, key: &'a CompanyKey) -> Vec<&'a str> {
        let mut fields: Vec<&str> = vec![key.as_ref()];
        for service in self.services.values() {
            fields.push(service.service_name.as_str());
            fields.push(service.description.as_str());
            fields.push(service.service_type.as_str());
        }
        fields
    }
}

/// Company as presented by the companies view.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyView {
    pub key: CompanyKey,
    pub service_count: usize,
    pub services: Vec<ServiceView>,
}

/// Service as presented by the companies view.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceView {
    pub key: ServiceKey,
    #[serde(flatten)]
    pub service: Service,
    pub price_display: Option<String>,
    pub average_rating: String,
    pub review_count: usize,
}

impl CompanyView {
    /// Build the view of one company.
    #[must_use]
    pub fn new(key: CompanyKey, company: Company) -> Self {
        let services: Vec<ServiceView> = company
            .services
            .into_iter()
            .map(|(key, service)| ServiceView {
                key,
                price_display: service.price_display(),
                average_rating: service.average_rating(),
                review_count: service.reviews.len(),
                service,
            })
            .collect();
        Self {
            key,
            service_count: services.len(),
            services,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service(value: serde_json::Value) -> Service {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_average_rating_one_decimal() {
        let s = service(json!({
            "serviceName": "Tutoring",
            "reviews": {
                "r1": {"rating": 4, "review": "good"},
                "r2": {"rating": 5, "review": "great"},
                "r3": {"rating": "4", "review": "fine"}
            }
        }));
        assert_eq!(s.average_rating(), "4.3");
    }

    #[test]
    fn test_average_rating_without_reviews() {
        let s = service(json!({"serviceName": "Tutoring"}));
        assert_eq!(s.average_rating(), NO_RATINGS);

        let unrated = service(json!({"reviews": {"r1": {"review": "no stars"}}}));
        assert_eq!(unrated.average_rating(), NO_RATINGS);
    }

    #[test]
    fn test_price_display() {
        assert_eq!(
            service(json!({"price": "25"})).price_display().as_deref(),
            Some("$25.00")
        );
        assert_eq!(
            service(json!({"price": 12.5})).price_display().as_deref(),
            Some("$12.50")
        );
        assert_eq!(
            service(json!({"price": "on request"})).price_display().as_deref(),
            Some("on request")
        );
        assert_eq!(service(json!({})).price_display(), None);
    }

    #[test]
    fn test_company_search_fields_cover_services() {
        let key = CompanyKey::try_from("acme".to_string()).unwrap();
        let company: Company = serde_json::from_value(json!({
            "services": {
                "s1": {"serviceName": "Deep Clean", "description": "Whole house", "serviceType": "cleaning"}
            }
        }))
        .unwrap();
        let fields = company.search_fields(&key);
        assert!(fields.contains(&"acme"));
        assert!(fields.contains(&"Deep Clean"));
        assert!(fields.contains(&"cleaning"));
    }

    #[test]
    fn test_company_view() {
        let key = CompanyKey::try_from("acme".to_string()).unwrap();
        let company: Company = serde_json::from_value(json!({
            "services": {"s1": {"serviceName": "A", "price": "10"}, "s2": {"serviceName": "B"}}
        }))
        .unwrap();
        let view = CompanyView::new(key, company);
        assert_eq!(view.service_count, 2);
        assert_eq!(view.services.first().map(|s| s.average_rating.as_str()), Some(NO_RATINGS));
    }
}
