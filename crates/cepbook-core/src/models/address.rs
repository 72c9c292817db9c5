use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{age_display, format_cep, normalize_cep};

/// A postal address as returned by the lookup service or built from the form.
///
/// Field names follow the ViaCEP payload so records round-trip unchanged
/// through the provider, the lookup cache and the stores.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    /// Postal code in canonical `NNNNN-NNN` form
    pub cep: String,
    /// Street name
    pub logradouro: String,
    #[serde(default)]
    pub complemento: String,
    /// Neighborhood
    #[serde(default)]
    pub bairro: String,
    /// City
    pub localidade: String,
    /// Two-letter state code
    pub uf: String,

    // Provider metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ibge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gia: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ddd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub siafi: Option<String>,
}

impl Address {
    /// Digits-only postal code, used as the lookup cache key
    pub fn cep_digits(&self) -> String {
        normalize_cep(&self.cep)
    }

    /// Postal code in canonical hyphenated form
    pub fn cep_display(&self) -> String {
        format_cep(&self.cep)
    }

    /// "Avenida Paulista, apto 12"
    pub fn street_line(&self) -> String {
        if self.complemento.trim().is_empty() {
            self.logradouro.clone()
        } else {
            format!("{}, {}", self.logradouro, self.complemento)
        }
    }

    /// "Bela Vista, São Paulo - SP"
    pub fn city_line(&self) -> String {
        if self.bairro.trim().is_empty() {
            format!("{} - {}", self.localidade, self.uf)
        } else {
            format!("{}, {} - {}", self.bairro, self.localidade, self.uf)
        }
    }

    /// Names of required fields that are still blank.
    /// A record with any of these missing must never be saved.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let required = [
            ("CEP", &self.cep),
            ("street", &self.logradouro),
            ("city", &self.localidade),
            ("state", &self.uf),
        ];
        required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect()
    }
}

/// An address that has been committed to the stores.
///
/// The identifier is assigned once at save time and never changes; the only
/// way to "edit" a saved address is to remove it and save a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAddress {
    pub id: String,
    #[serde(flatten)]
    pub address: Address,
    /// Absent on records written before save times were tracked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl SavedAddress {
    pub fn new(id: String, address: Address) -> Self {
        Self {
            id,
            address,
            saved_at: Some(Utc::now()),
        }
    }

    pub fn age_display(&self) -> Option<String> {
        self.saved_at.map(age_display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paulista() -> Address {
        Address {
            cep: "01310-100".to_string(),
            logradouro: "Avenida Paulista".to_string(),
            complemento: "de 612 a 1510 - lado par".to_string(),
            bairro: "Bela Vista".to_string(),
            localidade: "São Paulo".to_string(),
            uf: "SP".to_string(),
            ibge: Some("3550308".to_string()),
            gia: Some("1004".to_string()),
            ddd: Some("11".to_string()),
            siafi: Some("7107".to_string()),
        }
    }

    #[test]
    fn test_parse_viacep_payload() {
        let json = r#"{"cep": "01310-100","logradouro": "Avenida Paulista","complemento": "de 612 a 1510 - lado par","unidade": "","bairro": "Bela Vista","localidade": "São Paulo","uf": "SP","estado": "São Paulo","regiao": "Sudeste","ibge": "3550308","gia": "1004","ddd": "11","siafi": "7107"}"#;

        let address: Address = serde_json::from_str(json).expect("Failed to parse ViaCEP test JSON");
        assert_eq!(address, paulista());
        assert_eq!(address.cep_digits(), "01310100");
    }

    #[test]
    fn test_parse_payload_without_metadata() {
        let json = r#"{"cep":"70040-010","logradouro":"Esplanada dos Ministérios","localidade":"Brasília","uf":"DF"}"#;

        let address: Address = serde_json::from_str(json).expect("Failed to parse minimal JSON");
        assert_eq!(address.complemento, "");
        assert_eq!(address.bairro, "");
        assert_eq!(address.ddd, None);
    }

    #[test]
    fn test_display_lines() {
        let address = paulista();
        assert_eq!(address.street_line(), "Avenida Paulista, de 612 a 1510 - lado par");
        assert_eq!(address.city_line(), "Bela Vista, São Paulo - SP");

        let bare = Address {
            complemento: String::new(),
            bairro: String::new(),
            ..paulista()
        };
        assert_eq!(bare.street_line(), "Avenida Paulista");
        assert_eq!(bare.city_line(), "São Paulo - SP");
    }

    #[test]
    fn test_missing_required_fields() {
        assert!(paulista().missing_required_fields().is_empty());

        let no_street = Address {
            logradouro: "  ".to_string(),
            ..paulista()
        };
        assert_eq!(no_street.missing_required_fields(), vec!["street"]);

        // Complement and neighborhood are optional
        let optional_blank = Address {
            complemento: String::new(),
            bairro: String::new(),
            ..paulista()
        };
        assert!(optional_blank.missing_required_fields().is_empty());

        assert_eq!(Address::default().missing_required_fields().len(), 4);
    }

    #[test]
    fn test_saved_address_flattens_id() {
        let saved = SavedAddress::new("abc".to_string(), paulista());
        let value = serde_json::to_value(&saved).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["logradouro"], "Avenida Paulista");
        assert!(value.get("address").is_none());
    }

    #[test]
    fn test_saved_address_without_timestamp_loads() {
        let json = r#"{"id":"01310-100-1717000000000","cep":"01310-100","logradouro":"Avenida Paulista","complemento":"","bairro":"Bela Vista","localidade":"São Paulo","uf":"SP"}"#;

        let saved: SavedAddress = serde_json::from_str(json).expect("Failed to parse saved record");
        assert_eq!(saved.id, "01310-100-1717000000000");
        assert_eq!(saved.saved_at, None);
        assert_eq!(saved.age_display(), None);
        assert_eq!(saved.address.uf, "SP");
    }
}
