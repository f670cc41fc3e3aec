//! Seller credential bundle and its encrypted store.
//!
//! The bundle travels as one JSON string (see [`Settings`]) and is kept under a
//! single secret name, `settings` by default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod encryption;
mod store;

pub use store::{SettingsStore, StoredSecret};

/// Known values of [`Settings::selling_partner_id_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SellingPartnerIdType {
    MerchantAccountId,
    VendorCode,
}

impl SellingPartnerIdType {
    pub fn as_str(self) -> &'static str {
        match self {
            SellingPartnerIdType::MerchantAccountId => "merchantAccountId",
            SellingPartnerIdType::VendorCode => "vendorCode",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "merchantAccountId" => Some(SellingPartnerIdType::MerchantAccountId),
            "vendorCode" => Some(SellingPartnerIdType::VendorCode),
            _ => None,
        }
    }
}

/// SP-API account settings. Absent fields deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub account_id: String,
    pub region: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub selling_partner_id: String,
    pub selling_partner_id_type: String,
    pub marketplace_id: String,
}

impl Settings {
    /// Parse the stored JSON bundle.
    pub fn from_secret_string(secret: &str) -> Result<Self> {
        serde_json::from_str(secret).context("Failed to parse settings secret")
    }

    /// The partner id type, when it is one of the known values.
    pub fn partner_id_type(&self) -> Option<SellingPartnerIdType> {
        SellingPartnerIdType::parse(&self.selling_partner_id_type)
    }

    fn fields(&self) -> [&str; 8] {
        [
            self.account_id.as_str(),
            self.region.as_str(),
            self.client_id.as_str(),
            self.client_secret.as_str(),
            self.refresh_token.as_str(),
            self.selling_partner_id.as_str(),
            self.selling_partner_id_type.as_str(),
            self.marketplace_id.as_str(),
        ]
    }
}

/// True when any field is blank after trimming.
pub fn are_settings_incomplete(settings: &Settings) -> bool {
    settings.fields().iter().any(|field| field.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Settings {
        Settings {
            account_id: "123456789012".to_string(),
            region: "us-east-1".to_string(),
            client_id: "amzn1.application-oa2-client.abc".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "Atzr|refresh".to_string(),
            selling_partner_id: "A1B2C3".to_string(),
            selling_partner_id_type: SellingPartnerIdType::MerchantAccountId.as_str().to_string(),
            marketplace_id: "ATVPDKIKX0DER".to_string(),
        }
    }

    #[test]
    fn complete_settings_are_not_incomplete() {
        assert!(!are_settings_incomplete(&complete()));
    }

    #[test]
    fn any_blank_field_makes_settings_incomplete() {
        let mut settings = complete();
        settings.marketplace_id = "   ".to_string();
        assert!(are_settings_incomplete(&settings));

        let mut settings = complete();
        settings.account_id.clear();
        assert!(are_settings_incomplete(&settings));

        assert!(are_settings_incomplete(&Settings::default()));
    }

    #[test]
    fn parses_camel_case_bundle_with_missing_fields() {
        let settings = Settings::from_secret_string(
            r#"{"clientId":"id","sellingPartnerIdType":"vendorCode","extra":1}"#,
        )
        .unwrap();

        assert_eq!(settings.client_id, "id");
        assert_eq!(settings.partner_id_type(), Some(SellingPartnerIdType::VendorCode));
        assert_eq!(settings.region, "");
        assert!(Settings::from_secret_string("not json").is_err());
    }

    #[test]
    fn partner_id_type_names_match_serde() {
        for kind in [SellingPartnerIdType::MerchantAccountId, SellingPartnerIdType::VendorCode] {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.as_str());
            assert_eq!(SellingPartnerIdType::parse(kind.as_str()), Some(kind));
        }

        let mut settings = complete();
        settings.selling_partner_id_type = "sellerId".to_string();
        assert_eq!(settings.partner_id_type(), None);
    }

    #[test]
    fn serializes_camel_case_keys() {
        let json = serde_json::to_value(complete()).unwrap();
        assert_eq!(json["refreshToken"], "Atzr|refresh");
        assert_eq!(json["sellingPartnerId"], "A1B2C3");
    }
}
