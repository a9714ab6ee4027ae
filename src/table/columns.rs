// src/table/columns.rs

/// Latitude as published in the consolidated IRVE file.
pub const SOURCE_LATITUDE: &str = "consolidated_latitude";
/// Longitude as published in the consolidated IRVE file.
pub const SOURCE_LONGITUDE: &str = "consolidated_longitude";

pub const LAT: &str = "lat";
pub const LON: &str = "lon";
pub const POWER: &str = "puissance_nominale";
pub const CHARGE_POINTS: &str = "nbre_pdc";
pub const OPERATOR: &str = "nom_operateur";
pub const FREE: &str = "gratuit";
pub const COMMISSIONING_DATE: &str = "date_mise_en_service";
pub const COMMUNE_CODE: &str = "code_insee_commune";
pub const STATION_NAME: &str = "nom_station";

// derived
pub const POWER_CATEGORY: &str = "categorie_puissance";
pub const COMMISSIONING_YEAR: &str = "annee_mes";
pub const DEPARTMENT_CODE: &str = "code_departement";
