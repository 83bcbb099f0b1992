use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Phone,
    Name,
    Address,
    Location,
    City,
    State,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::Phone,
        CanonicalField::Name,
        CanonicalField::Address,
        CanonicalField::Location,
        CanonicalField::City,
        CanonicalField::State,
    ];

    /// Lower-case header names recognized for this field, in priority order.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            CanonicalField::Phone => &[
                "phone",
                "mobile",
                "number",
                "contact",
                "phone_number",
                "ph",
                "msisdn",
                "tel_number",
            ],
            CanonicalField::Name => &["name", "full_name", "fullname", "result_name"],
            CanonicalField::Address => &["addr", "address", "street"],
            CanonicalField::Location => &["loc", "location", "result_loc"],
            CanonicalField::City => &["city", "town"],
            CanonicalField::State => &["state", "region", "belong_area"],
        }
    }
}

/// Source header bound to each canonical field, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub phone: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl ColumnMapping {
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn is_bound(&self, header: &str) -> bool {
        CanonicalField::ALL
            .into_iter()
            .any(|field| self.get(field) == Some(header))
    }

    pub fn is_empty(&self) -> bool {
        CanonicalField::ALL
            .into_iter()
            .all(|field| self.get(field).is_none())
    }

    fn slot(&self, field: CanonicalField) -> &Option<String> {
        match field {
            CanonicalField::Phone => &self.phone,
            CanonicalField::Name => &self.name,
            CanonicalField::Address => &self.address,
            CanonicalField::Location => &self.location,
            CanonicalField::City => &self.city,
            CanonicalField::State => &self.state,
        }
    }

    fn slot_mut(&mut self, field: CanonicalField) -> &mut Option<String> {
        match field {
            CanonicalField::Phone => &mut self.phone,
            CanonicalField::Name => &mut self.name,
            CanonicalField::Address => &mut self.address,
            CanonicalField::Location => &mut self.location,
            CanonicalField::City => &mut self.city,
            CanonicalField::State => &mut self.state,
        }
    }
}

/// Binds each canonical field to the header matching its highest-priority
/// alias, compared case-insensitively after trimming. Unmatched fields stay
/// unbound.
pub fn detect_mapping<S: AsRef<str>>(headers: &[S]) -> ColumnMapping {
    let lowered: Vec<String> = headers
        .iter()
        .map(|header| header.as_ref().trim().to_lowercase())
        .collect();
    let mut mapping = ColumnMapping::default();
    for field in CanonicalField::ALL {
        let found = field
            .aliases()
            .iter()
            .find_map(|alias| lowered.iter().position(|header| header == alias));
        if let Some(index) = found {
            *mapping.slot_mut(field) = Some(headers[index].as_ref().to_string());
        }
    }
    mapping
}
