use crate::api::balance::{BalanceQuery, BalanceReport};
use crate::api::department::CreateDepartment;
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::job::{CreateJob, JobFilter};
use crate::api::leave::{
    ApproveLeave, LeaveFilter, LeaveListResponse, RejectLeave, SubmitLeave,
};
use crate::api::leave_type::{CreateLeaveType, LeaveTypeFilter, UpdateLeaveType};
use crate::ledger::balance::LeaveBalance;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::job::Job;
use crate::model::leave_application::{LeaveApplication, LeaveStatus};
use crate::model::leave_type::LeaveType;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Ledger API",
        version = "1.0.0",
        description = r#"
## Leave Ledger

This API manages leave types, leave applications and per-year leave balances
on top of an employee directory.

### 🔹 Key Features
- **Leave Type Registry**
  - Define leave policies: annual allocation, consecutive-day and notice
    rules, carry-forward
- **Leave Application Workflow**
  - Submit, approve, reject and cancel leave applications with full
    validation against employment dates and available balance
- **Balance Ledger**
  - Per employee, leave type and year: allocated, used and available days,
    with carry-forward of unused days
- **Directory**
  - Employees, departments and jobs

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave::leave_list,
        crate::api::leave::get_leave,
        crate::api::leave::submit_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,
        crate::api::leave::cancel_leave,

        crate::api::balance::get_balance,

        crate::api::leave_type::create_leave_type,
        crate::api::leave_type::list_leave_types,
        crate::api::leave_type::get_leave_type,
        crate::api::leave_type::update_leave_type,
        crate::api::leave_type::delete_leave_type,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::department::create_department,
        crate::api::department::list_departments,
        crate::api::department::get_department,
        crate::api::department::update_department,
        crate::api::department::delete_department,

        crate::api::job::create_job,
        crate::api::job::list_jobs,
        crate::api::job::get_job,
        crate::api::job::update_job,
        crate::api::job::delete_job
    ),
    components(
        schemas(
            Employee,
            CreateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            Department,
            CreateDepartment,
            Job,
            CreateJob,
            JobFilter,
            LeaveType,
            CreateLeaveType,
            UpdateLeaveType,
            LeaveTypeFilter,
            LeaveApplication,
            LeaveStatus,
            SubmitLeave,
            ApproveLeave,
            RejectLeave,
            LeaveFilter,
            LeaveListResponse,
            LeaveBalance,
            BalanceQuery,
            BalanceReport
        )
    ),
    tags(
        (name = "Leave", description = "Leave application workflow APIs"),
        (name = "Balance", description = "Leave balance reporting APIs"),
        (name = "LeaveType", description = "Leave type registry APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Department", description = "Department management APIs"),
        (name = "Job", description = "Job management APIs"),
    )
)]
pub struct ApiDoc;
