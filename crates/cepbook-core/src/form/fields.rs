use crate::models::Address;
use crate::utils::{format_cep, normalize_cep};

/// Fields of the address form, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Cep,
    Uf,
    Logradouro,
    Complemento,
    Bairro,
    Localidade,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Cep,
        FormField::Uf,
        FormField::Logradouro,
        FormField::Complemento,
        FormField::Bairro,
        FormField::Localidade,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Cep => "CEP",
            FormField::Uf => "UF",
            FormField::Logradouro => "Street",
            FormField::Complemento => "Complement",
            FormField::Bairro => "Neighborhood",
            FormField::Localidade => "City",
        }
    }

    /// Must be non-empty before the address can be saved
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            FormField::Cep | FormField::Uf | FormField::Logradouro | FormField::Localidade
        )
    }

    /// Typed by the user. The rest are only filled in by a lookup.
    pub fn is_user_editable(&self) -> bool {
        matches!(self, FormField::Cep | FormField::Complemento | FormField::Bairro)
    }

    /// Next field (wrapping around)
    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Previous field (wrapping around)
    pub fn prev(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Current contents of the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFields {
    pub cep: String,
    pub logradouro: String,
    pub complemento: String,
    pub bairro: String,
    pub localidade: String,
    pub uf: String,
}

impl AddressFields {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Cep => &self.cep,
            FormField::Uf => &self.uf,
            FormField::Logradouro => &self.logradouro,
            FormField::Complemento => &self.complemento,
            FormField::Bairro => &self.bairro,
            FormField::Localidade => &self.localidade,
        }
    }

    pub(crate) fn get_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Cep => &mut self.cep,
            FormField::Uf => &mut self.uf,
            FormField::Logradouro => &mut self.logradouro,
            FormField::Complemento => &mut self.complemento,
            FormField::Bairro => &mut self.bairro,
            FormField::Localidade => &mut self.localidade,
        }
    }

    pub fn cep_digits(&self) -> String {
        normalize_cep(&self.cep)
    }

    /// Overwrite every field with a lookup result
    pub fn fill_from(&mut self, address: &Address) {
        self.cep = format_cep(&address.cep);
        self.logradouro = address.logradouro.clone();
        self.complemento = address.complemento.clone();
        self.bairro = address.bairro.clone();
        self.localidade = address.localidade.clone();
        self.uf = address.uf.clone();
    }

    /// Build an address from the form. Provider metadata is carried over
    /// from `looked_up` when it belongs to the same CEP.
    pub fn to_address(&self, looked_up: Option<&Address>) -> Address {
        let metadata = looked_up.filter(|a| a.cep_digits() == self.cep_digits());

        Address {
            cep: self.cep.trim().to_string(),
            logradouro: self.logradouro.trim().to_string(),
            complemento: self.complemento.trim().to_string(),
            bairro: self.bairro.trim().to_string(),
            localidade: self.localidade.trim().to_string(),
            uf: self.uf.trim().to_string(),
            ibge: metadata.and_then(|a| a.ibge.clone()),
            gia: metadata.and_then(|a| a.gia.clone()),
            ddd: metadata.and_then(|a| a.ddd.clone()),
            siafi: metadata.and_then(|a| a.siafi.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_cycle() {
        assert_eq!(FormField::Cep.next(), FormField::Uf);
        assert_eq!(FormField::Localidade.next(), FormField::Cep);
        assert_eq!(FormField::Cep.prev(), FormField::Localidade);
        for field in FormField::ALL {
            assert_eq!(field.next().prev(), field);
        }
    }

    #[test]
    fn test_required_and_editable() {
        let required: Vec<_> = FormField::ALL.iter().filter(|f| f.is_required()).collect();
        assert_eq!(required.len(), 4);
        assert!(!FormField::Complemento.is_required());
        assert!(!FormField::Bairro.is_required());

        assert!(FormField::Complemento.is_user_editable());
        assert!(!FormField::Logradouro.is_user_editable());
        assert!(!FormField::Uf.is_user_editable());
    }

    #[test]
    fn test_to_address_keeps_metadata_for_same_cep() {
        let looked_up = Address {
            cep: "01310-100".to_string(),
            logradouro: "Avenida Paulista".to_string(),
            localidade: "São Paulo".to_string(),
            uf: "SP".to_string(),
            ddd: Some("11".to_string()),
            ..Default::default()
        };

        let mut fields = AddressFields::default();
        fields.fill_from(&looked_up);
        fields.complemento = " apto 12 ".to_string();

        let address = fields.to_address(Some(&looked_up));
        assert_eq!(address.complemento, "apto 12");
        assert_eq!(address.ddd.as_deref(), Some("11"));

        fields.cep = "20040-020".to_string();
        assert_eq!(fields.to_address(Some(&looked_up)).ddd, None);
    }
}
