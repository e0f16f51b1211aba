// ordfix-core/src/domain/order/record.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// Reference data for one order number.
///
/// Field names on the wire follow the snapshot export (French column keys),
/// the Rust names follow what the values mean in the XML documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,

    #[serde(rename = "code_agence", default, skip_serializing_if = "Option::is_none")]
    pub agency_code: Option<String>,

    #[serde(rename = "emploi_cc", default, skip_serializing_if = "Option::is_none")]
    pub position_code: Option<String>,

    #[serde(rename = "categorie_socio", default, skip_serializing_if = "Option::is_none")]
    pub socio_category: Option<String>,

    #[serde(rename = "classement_cc", default, skip_serializing_if = "Option::is_none")]
    pub position_coefficient: Option<String>,

    #[serde(rename = "centre_analyse", default, skip_serializing_if = "Option::is_none")]
    pub cost_center_name: Option<String>,

    #[serde(
        rename = "centre_analyse_prefix",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cost_center_prefix: Option<String>,

    #[serde(rename = "siret_client", default, skip_serializing_if = "Option::is_none")]
    pub siret: Option<String>,

    #[serde(rename = "site_mission", default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,

    /// True unless the mission site is the excluded site.
    #[serde(rename = "site_not_gemenos", default = "default_site_flag")]
    pub site_flag: bool,

    #[serde(rename = "date_debut", default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(rename = "date_fin", default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    #[serde(rename = "nom_fichier", default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(
        rename = "timestamp_traitement",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub processed_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

fn default_site_flag() -> bool {
    true
}

impl OrderRecord {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            client: None,
            agency_code: None,
            position_code: None,
            socio_category: None,
            position_coefficient: None,
            cost_center_name: None,
            cost_center_prefix: None,
            siret: None,
            site_name: None,
            site_flag: true,
            start_date: None,
            end_date: None,
            file_name: None,
            processed_at: None,
            last_updated: None,
        }
    }

    /// Value of `field`, or `None` when absent or blank.
    pub fn value(&self, field: SourceField) -> Option<&str> {
        let raw = match field {
            SourceField::OrderId => Some(self.order_id.as_str()),
            SourceField::Client => self.client.as_deref(),
            SourceField::AgencyCode => self.agency_code.as_deref(),
            SourceField::PositionCode => self.position_code.as_deref(),
            SourceField::SocioCategory => self.socio_category.as_deref(),
            SourceField::PositionCoefficient => self.position_coefficient.as_deref(),
            SourceField::CostCenterName => self.cost_center_name.as_deref(),
            SourceField::CostCenterPrefix => self.cost_center_prefix.as_deref(),
            SourceField::Siret => self.siret.as_deref(),
            SourceField::SiteName => self.site_name.as_deref(),
            SourceField::StartDate => self.start_date.as_deref(),
            SourceField::EndDate => self.end_date.as_deref(),
        };
        raw.map(str::trim).filter(|v| !v.is_empty())
    }

    /// Site flag as derived from the mission site: false only when the site
    /// mentions `excluded_site` (case-insensitive).
    pub fn derive_site_flag(site_name: Option<&str>, excluded_site: &str) -> bool {
        match site_name {
            Some(site) => !site
                .to_uppercase()
                .contains(&excluded_site.trim().to_uppercase()),
            None => true,
        }
    }
}

/// Record attributes a correction rule may read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceField {
    OrderId,
    Client,
    #[serde(alias = "code_agence")]
    AgencyCode,
    #[serde(alias = "emploi_cc")]
    PositionCode,
    #[serde(alias = "categorie_socio")]
    SocioCategory,
    #[serde(alias = "classement_cc")]
    PositionCoefficient,
    #[serde(alias = "centre_analyse")]
    CostCenterName,
    #[serde(alias = "centre_analyse_prefix")]
    CostCenterPrefix,
    #[serde(alias = "siret_client")]
    Siret,
    #[serde(alias = "site_mission")]
    SiteName,
    #[serde(alias = "date_debut")]
    StartDate,
    #[serde(alias = "date_fin")]
    EndDate,
}

impl SourceField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderId => "order_id",
            Self::Client => "client",
            Self::AgencyCode => "agency_code",
            Self::PositionCode => "position_code",
            Self::SocioCategory => "socio_category",
            Self::PositionCoefficient => "position_coefficient",
            Self::CostCenterName => "cost_center_name",
            Self::CostCenterPrefix => "cost_center_prefix",
            Self::Siret => "siret",
            Self::SiteName => "site_name",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
        }
    }
}

impl fmt::Display for SourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SourceField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "order_id" => Ok(Self::OrderId),
            "client" => Ok(Self::Client),
            "agency_code" | "code_agence" => Ok(Self::AgencyCode),
            "position_code" | "emploi_cc" => Ok(Self::PositionCode),
            "socio_category" | "categorie_socio" => Ok(Self::SocioCategory),
            "position_coefficient" | "classement_cc" => Ok(Self::PositionCoefficient),
            "cost_center_name" | "centre_analyse" => Ok(Self::CostCenterName),
            "cost_center_prefix" | "centre_analyse_prefix" => Ok(Self::CostCenterPrefix),
            "siret" | "siret_client" => Ok(Self::Siret),
            "site_name" | "site_mission" => Ok(Self::SiteName),
            "start_date" | "date_debut" => Ok(Self::StartDate),
            "end_date" | "date_fin" => Ok(Self::EndDate),
            _ => Err(DomainError::UnknownValue {
                kind: "source field",
                value: s.to_string(),
            }),
        }
    }
}
