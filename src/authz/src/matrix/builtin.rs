//! Permission matrix shipped with the platform

use super::PermissionMatrix;
use crate::error::Result;
use crate::role::Role;
use crate::types::ActionKind::{Approve, Create, Delete, Edit, View};
use once_cell::sync::Lazy;
use std::sync::Arc;

static DEFAULT_MATRIX: Lazy<Arc<PermissionMatrix>> = Lazy::new(|| {
    Arc::new(build().expect("built-in permission matrix must cover every role and action"))
});

/// Process-wide built-in matrix, validated on first use
///
/// The built-in table is covered by unit tests; a failure here means the
/// binary was built from a broken table and startup must not continue.
pub fn default_matrix() -> Arc<PermissionMatrix> {
    Arc::clone(&DEFAULT_MATRIX)
}

const NONE: [&str; 0] = [];

pub(super) fn build() -> Result<PermissionMatrix> {
    PermissionMatrix::builder()
        .all(Role::SystemAdmin)
        // Cán bộ tổ chức sự kiện
        .set(Role::EventOrganizer, View, [
            "SuKien", "LoaiSuKien", "Phong", "TrangThietBi", "YeuCauMuonPhong",
            "LichDatPhong", "ThongBao", "DanhGiaSuKien", "NguoiThamGiaSuKien", "DonVi",
        ])
        .set(Role::EventOrganizer, Create, ["SuKien", "YeuCauMuonPhong", "ThongBao"])
        .set(Role::EventOrganizer, Edit, ["SuKien", "YeuCauMuonPhong"])
        .set(Role::EventOrganizer, Delete, ["SuKien", "YeuCauMuonPhong"])
        .set(Role::EventOrganizer, Approve, NONE)
        // Quản lý cơ sở vật chất
        .set(Role::FacilityManager, View, [
            "Phong", "LoaiPhong", "TrangThietBi", "YeuCauMuonPhong", "LichDatPhong",
            "SuKien", "ThongBao",
        ])
        .set(Role::FacilityManager, Create, ["Phong", "TrangThietBi", "LichDatPhong"])
        .set(Role::FacilityManager, Edit, [
            "Phong", "TrangThietBi", "LichDatPhong", "YeuCauMuonPhong.TrangThaiYcID",
        ])
        .set(Role::FacilityManager, Delete, ["Phong", "TrangThietBi"])
        .set(Role::FacilityManager, Approve, ["YeuCauMuonPhong"])
        // Trưởng khoa
        .set(Role::DepartmentHead, View, [
            "SuKien", "LoaiSuKien", "Phong", "LichDatPhong", "ThongBao", "DanhGiaSuKien",
            "NguoiThamGiaSuKien", "BaoCao",
        ])
        .set(Role::DepartmentHead, Create, NONE)
        .set(Role::DepartmentHead, Edit, NONE)
        .set(Role::DepartmentHead, Delete, NONE)
        .set(Role::DepartmentHead, Approve, NONE)
        // Trưởng CLB
        .set(Role::ClubLead, View, [
            "SuKien", "LoaiSuKien", "Phong", "LichDatPhong", "ThongBao", "NguoiThamGiaSuKien",
        ])
        .set(Role::ClubLead, Create, ["SuKien", "YeuCauMuonPhong"])
        .set(Role::ClubLead, Edit, ["SuKien"])
        .set(Role::ClubLead, Delete, NONE)
        .set(Role::ClubLead, Approve, NONE)
        // Bí thư Đoàn
        .set(Role::UnionSecretary, View, [
            "SuKien", "LoaiSuKien", "Phong", "LichDatPhong", "ThongBao", "NguoiThamGiaSuKien",
            "DanhGiaSuKien",
        ])
        .set(Role::UnionSecretary, Create, ["SuKien", "YeuCauMuonPhong", "ThongBao"])
        .set(Role::UnionSecretary, Edit, ["SuKien"])
        .set(Role::UnionSecretary, Delete, NONE)
        .set(Role::UnionSecretary, Approve, NONE)
        // BGH duyệt sự kiện: only the status field of an event is editable
        .set(Role::SchoolBoardApprover, View, [
            "SuKien", "LoaiSuKien", "DonVi", "YeuCauMuonPhong", "LichDatPhong",
            "DanhGiaSuKien", "BaoCao",
        ])
        .set(Role::SchoolBoardApprover, Create, NONE)
        .set(Role::SchoolBoardApprover, Edit, ["SuKien.TrangThaiSkID"])
        .set(Role::SchoolBoardApprover, Delete, NONE)
        .set(Role::SchoolBoardApprover, Approve, ["SuKien"])
        // Sinh viên
        .set(Role::Student, View, ["SuKien", "LoaiSuKien", "ThongBao", "LichDatPhong"])
        .set(Role::Student, Create, ["DanhGiaSuKien", "NguoiThamGiaSuKien"])
        .set(Role::Student, Edit, NONE)
        .set(Role::Student, Delete, NONE)
        .set(Role::Student, Approve, NONE)
        // Giảng viên
        .set(Role::Lecturer, View, ["SuKien", "LoaiSuKien", "ThongBao", "LichDatPhong", "Phong"])
        .set(Role::Lecturer, Create, ["DanhGiaSuKien", "NguoiThamGiaSuKien", "YeuCauMuonPhong"])
        .set(Role::Lecturer, Edit, NONE)
        .set(Role::Lecturer, Delete, NONE)
        .set(Role::Lecturer, Approve, NONE)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionKind;

    #[test]
    fn test_builtin_is_complete() {
        assert!(build().is_ok());
    }

    #[test]
    fn test_default_matrix_is_shared() {
        assert!(Arc::ptr_eq(&default_matrix(), &default_matrix()));
        assert_eq!(*default_matrix(), build().unwrap());
    }

    #[test]
    fn test_only_admin_holds_wildcards() {
        let matrix = default_matrix();
        for role in Role::ALL {
            for action in ActionKind::ALL {
                assert_eq!(
                    matrix.entry(role, action).is_wildcard(),
                    role == Role::SystemAdmin,
                    "{} / {}",
                    role,
                    action
                );
            }
        }
    }

    #[test]
    fn test_empty_approve_sets_preserved() {
        let matrix = default_matrix();
        for role in [Role::DepartmentHead, Role::ClubLead, Role::UnionSecretary] {
            assert!(matrix.entry(role, Approve).is_empty());
        }
    }
}
