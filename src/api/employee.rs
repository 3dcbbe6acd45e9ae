use crate::directory::{self, ContactUpdate, EmployeeSearch, NewEmployee};
use crate::error::HrError;
use crate::model::employee::Employee;
use crate::model::employment::JobInfo;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

/// Enroll Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = NewEmployee,
    responses(
        (status = 201, description = "Employee enrolled", body = Employee),
        (status = 400, description = "Missing required fields", body = Object, example = json!({
            "message": "first_name must not be empty"
        })),
        (status = 409, description = "Identification number already registered", body = Object, example = json!({
            "message": "identification number already registered"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<SqlitePool>,
    payload: web::Json<NewEmployee>,
) -> Result<HttpResponse, HrError> {
    let employee = directory::create_employee(pool.get_ref(), payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(employee))
}

/// Search Employees
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(
        ("first_name", Query, description = "Substring filter on first name"),
        ("last_name", Query, description = "Substring filter on last name"),
        ("identification_number", Query, description = "Substring filter on identification number"),
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn search_employees(
    pool: web::Data<SqlitePool>,
    query: web::Query<EmployeeSearch>,
) -> Result<HttpResponse, HrError> {
    let (page, per_page) = query.paging();
    let (data, total) = directory::search_employees(pool.get_ref(), &query).await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, HrError> {
    let employee = directory::get_employee(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Get Employee by Identification Number
#[utoipa::path(
    get,
    path = "/api/v1/employees/by-identification/{number}",
    params(
        ("number", Path, description = "Identification number")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn get_by_identification(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> Result<HttpResponse, HrError> {
    let employee = directory::get_by_identification(pool.get_ref(), &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Update Contact Details
#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}/contact",
    params(
        ("id", Path, description = "Employee ID")
    ),
    request_body = ContactUpdate,
    responses(
        (status = 200, description = "Contact details updated", body = Employee),
        (status = 400, description = "No contact fields provided", body = Object, example = json!({
            "message": "no contact fields provided"
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn update_contact(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<ContactUpdate>,
) -> Result<HttpResponse, HrError> {
    let employee =
        directory::update_contact(pool.get_ref(), path.into_inner(), payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Get Employment Information
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}/job",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Current employment record", body = JobInfo),
        (status = 404, description = "No employment record", body = Object, example = json!({
            "message": "employment record not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn job_info(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, HrError> {
    let info = directory::job_info(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(info))
}
