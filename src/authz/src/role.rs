//! Role catalog
//!
//! The closed set of roles known to the platform. Roles are configuration,
//! not entities: nothing creates or removes them at runtime. Each role has a
//! stable wire code used by storage, matrix configuration and HTTP.

use crate::error::{AuthzError, Result};
use crate::types::UserType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role held by an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    SystemAdmin,
    EventOrganizer,
    FacilityManager,
    DepartmentHead,
    ClubLead,
    UnionSecretary,
    SchoolBoardApprover,
    Student,
    Lecturer,
}

impl Role {
    /// Every role in the catalog
    pub const ALL: [Role; 9] = [
        Role::SystemAdmin,
        Role::EventOrganizer,
        Role::FacilityManager,
        Role::DepartmentHead,
        Role::ClubLead,
        Role::UnionSecretary,
        Role::SchoolBoardApprover,
        Role::Student,
        Role::Lecturer,
    ];

    /// Stable wire code
    pub fn code(&self) -> &'static str {
        match self {
            Role::SystemAdmin => "ADMIN_HE_THONG",
            Role::EventOrganizer => "CB_TO_CHUC_SU_KIEN",
            Role::FacilityManager => "QL_CSVC",
            Role::DepartmentHead => "TRUONG_KHOA",
            Role::ClubLead => "TRUONG_CLB",
            Role::UnionSecretary => "BI_THU_DOAN",
            Role::SchoolBoardApprover => "BGH_DUYET_SK",
            Role::Student => "SINH_VIEN",
            Role::Lecturer => "GIANG_VIEN",
        }
    }

    /// Label shown in the UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::SystemAdmin => "Quản trị hệ thống",
            Role::EventOrganizer => "Cán bộ tổ chức sự kiện",
            Role::FacilityManager => "Quản lý cơ sở vật chất",
            Role::DepartmentHead => "Trưởng khoa",
            Role::ClubLead => "Trưởng câu lạc bộ",
            Role::UnionSecretary => "Bí thư Đoàn",
            Role::SchoolBoardApprover => "Ban giám hiệu duyệt sự kiện",
            Role::Student => "Sinh viên",
            Role::Lecturer => "Giảng viên",
        }
    }

    /// Row index in the permission matrix (declaration order)
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }

    /// Classification of the role
    pub fn user_type(&self) -> UserType {
        match self {
            Role::SystemAdmin
            | Role::EventOrganizer
            | Role::FacilityManager
            | Role::SchoolBoardApprover => UserType::Staff,
            Role::DepartmentHead | Role::UnionSecretary | Role::Lecturer => UserType::Lecturer,
            Role::ClubLead | Role::Student => UserType::Student,
        }
    }
}

/// User type for an untyped role code, e.g. one read back from storage
pub fn user_type_of(code: &str) -> Result<UserType> {
    Ok(code.parse::<Role>()?.user_type())
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .into_iter()
            .find(|role| role.code() == s)
            .ok_or_else(|| AuthzError::UnknownRole(s.to_string()))
    }
}

impl TryFrom<String> for Role {
    type Error = AuthzError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.code().to_string()
    }
}
