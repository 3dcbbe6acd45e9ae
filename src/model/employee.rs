use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CivilStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

/// Full employee profile. Identity fields (names, identification, birth
/// date, gender, nationality, civil status) are immutable after enrollment;
/// only the contact/address fields have an update path.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "first_name": "Maria",
        "last_name": "Lopez",
        "identification_type": "DNI",
        "identification_number": "30123456",
        "birth_date": "1990-04-12",
        "email": "maria.lopez@company.com",
        "phone": "+54911223344",
        "street": "Av. Rivadavia",
        "street_number": "1250",
        "locality": "Caballito",
        "district": "Comuna 6",
        "province": "Buenos Aires",
        "gender": "female",
        "nationality": "Argentina",
        "civil_status": "single"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "Maria")]
    pub first_name: String,

    #[schema(example = "Lopez")]
    pub last_name: String,

    #[schema(example = "DNI")]
    pub identification_type: String,

    #[schema(example = "30123456")]
    pub identification_number: String,

    #[schema(example = "1990-04-12", value_type = String, format = "date")]
    pub birth_date: NaiveDate,

    #[schema(example = "maria.lopez@company.com")]
    pub email: String,

    #[schema(example = "+54911223344")]
    pub phone: String,

    #[schema(example = "Av. Rivadavia")]
    pub street: String,

    #[schema(example = "1250")]
    pub street_number: String,

    #[schema(example = "Caballito")]
    pub locality: String,

    #[schema(example = "Comuna 6")]
    pub district: String,

    #[schema(example = "Buenos Aires")]
    pub province: String,

    #[schema(example = "female")]
    pub gender: Gender,

    #[schema(example = "Argentina")]
    pub nationality: String,

    #[schema(example = "single")]
    pub civil_status: CivilStatus,
}
