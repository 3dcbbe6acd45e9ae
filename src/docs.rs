use crate::api::attendance::{HoursResponse, PunchRequest};
use crate::api::employee::EmployeeListResponse;
use crate::directory::{ContactUpdate, EmployeeSearch, NewEmployee};
use crate::engine::attendance::ManualRegistration;
use crate::engine::calendar::CalendarUpsert;
use crate::model::attendance::{AttendanceEvent, PunchKind};
use crate::model::calendar::{CalendarEntry, WorkState};
use crate::model::employee::{CivilStatus, Employee, Gender};
use crate::model::employment::JobInfo;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracking API",
        version = "1.0.0",
        description = r#"
## HR / Attendance Tracking Backend

Employee records, work calendars and time-clock registrations for a
single organization, behind a trusted gateway.

### 🔹 Key Features
- **Employee Directory**
  - Enrollment, lookup by id or identification number, contact updates,
    paginated search, employment metadata
- **Work Calendar**
  - One authoritative row per employee per day: state, entry/exit times,
    worked and overtime hours
- **Attendance**
  - Clock punches from terminals, administrative manual registration,
    monthly hour aggregation

### 🔐 Access
The service trusts the gateway in front of it. Administrative endpoints
read the caller's role from the `X-Role` header (`admin | hr | employee`).

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for the directory search
- Errors are `{"message": "..."}` with 400/403/404/409 semantics

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::search_employees,
        crate::api::employee::get_employee,
        crate::api::employee::get_by_identification,
        crate::api::employee::update_contact,
        crate::api::employee::job_info,

        crate::api::calendar::upsert_entry,
        crate::api::calendar::list_entries,

        crate::api::attendance::punch,
        crate::api::attendance::manual,
        crate::api::attendance::monthly_hours,
        crate::api::attendance::list_events
    ),
    components(
        schemas(
            Employee,
            NewEmployee,
            ContactUpdate,
            EmployeeSearch,
            EmployeeListResponse,
            JobInfo,
            CalendarEntry,
            CalendarUpsert,
            AttendanceEvent,
            ManualRegistration,
            PunchRequest,
            HoursResponse,
            WorkState,
            PunchKind,
            Gender,
            CivilStatus
        )
    ),
    tags(
        (name = "Employee", description = "Employee directory APIs"),
        (name = "Calendar", description = "Work calendar APIs"),
        (name = "Attendance", description = "Attendance and time-clock APIs"),
    )
)]
pub struct ApiDoc;
