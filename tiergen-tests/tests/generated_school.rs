//! Checks on the C# tiers build.rs generated from fixtures/school.sql
//!
//! The files are read back from OUT_DIR, so these tests see exactly what the
//! build-script entry point writes to disk.

macro_rules! generated {
    ($path:literal) => {
        include_str!(concat!(env!("OUT_DIR"), "/", $path))
    };
}

const STUDENT_DAL: &str = generated!("School.DataAccess/clsStudentData.cs");
const STUDENT_BLL: &str = generated!("School.BusinessLogic/clsStudent.cs");
const COURSE_DAL: &str = generated!("School.DataAccess/clsCourseData.cs");
const COURSE_BLL: &str = generated!("School.BusinessLogic/clsCourse.cs");
const ENROLLMENT_DAL: &str = generated!("School.DataAccess/clsEnrollmentData.cs");
const ENROLLMENT_BLL: &str = generated!("School.BusinessLogic/clsEnrollment.cs");
const AUDIT_DAL: &str = generated!("School.DataAccess/clsAuditLogData.cs");
const AUDIT_BLL: &str = generated!("School.BusinessLogic/clsAuditLog.cs");

fn public_methods(source: &str) -> Vec<&str> {
    source
        .lines()
        .map(str::trim)
        .filter(|l| l.contains('('))
        .filter(|l| l.starts_with("public static") || l.starts_with("public bool") || l.starts_with("private bool"))
        .filter_map(|l| l.split('(').next())
        .filter_map(|l| l.rsplit(' ').next())
        .collect()
}

mod data_access {
    use super::*;

    #[test]
    fn test_namespace_and_usings() {
        assert!(STUDENT_DAL.starts_with(
            "using System;\nusing System.Data;\nusing System.Data.SqlClient;\n\nnamespace School.DataAccess\n{\n    public class clsStudentData\n"
        ));
    }

    #[test]
    fn test_keyed_table_gets_full_crud() {
        assert_eq!(
            public_methods(STUDENT_DAL),
            [
                "GetAllStudents",
                "AddNewStudent",
                "GetStudentByID",
                "UpdateStudent",
                "DeleteStudent",
                "IsStudentExists"
            ]
        );
    }

    #[test]
    fn test_create_lists_share_ordinal_order() {
        assert!(STUDENT_DAL.contains(
            "public static int AddNewStudent(string Name, decimal? GPA, string Email, DateTime EnrolledOn, bool IsActive)"
        ));
        assert!(STUDENT_DAL.contains(
            "INSERT INTO Students (Name, GPA, Email, EnrolledOn, IsActive) VALUES (@Name, @GPA, @Email, @EnrolledOn, @IsActive); SELECT SCOPE_IDENTITY();"
        ));
    }

    #[test]
    fn test_read_by_key_fills_ref_slots() {
        assert!(STUDENT_DAL.contains(
            "public static bool GetStudentByID(int StudentID, ref string Name, ref decimal? GPA, ref string Email, ref DateTime EnrolledOn, ref bool IsActive)"
        ));
        assert!(STUDENT_DAL.contains("string query = \"SELECT * FROM Students WHERE StudentID = @StudentID\";"));
        assert!(STUDENT_DAL.contains("GPA = reader[\"GPA\"] == DBNull.Value ? null : (decimal?)reader[\"GPA\"];"));
        assert!(STUDENT_DAL.contains("Email = reader[\"Email\"] == DBNull.Value ? null : (string)reader[\"Email\"];"));
        assert!(STUDENT_DAL.contains("EnrolledOn = (DateTime)reader[\"EnrolledOn\"];"));
    }

    #[test]
    fn test_update_binds_nulls_as_dbnull() {
        assert!(STUDENT_DAL.contains(
            "UPDATE Students SET Name = @Name, GPA = @GPA, Email = @Email, EnrolledOn = @EnrolledOn, IsActive = @IsActive WHERE StudentID = @StudentID"
        ));
        // Once in AddNew, once in Update
        assert_eq!(
            STUDENT_DAL
                .matches("cmd.Parameters.AddWithValue(\"@GPA\", GPA ?? (object)DBNull.Value);")
                .count(),
            2
        );
        assert!(STUDENT_DAL.contains("cmd.Parameters.AddWithValue(\"@Name\", Name);"));
    }

    #[test]
    fn test_bigint_key_returns_long() {
        assert!(COURSE_DAL.contains(
            "public static long AddNewCourse(string Title, short? Credits, decimal? Fee)"
        ));
        assert!(COURSE_DAL.contains("long insertedID = -1;"));
        assert!(COURSE_DAL.contains("public static bool DeleteCourse(long CourseID)"));
        assert!(COURSE_DAL.contains("string query = \"SELECT 1 FROM Courses WHERE CourseID = @CourseID\";"));
    }

    #[test]
    fn test_composite_and_keyless_tables_are_read_only() {
        assert_eq!(public_methods(ENROLLMENT_DAL), ["GetAllEnrollments"]);
        assert_eq!(public_methods(AUDIT_DAL), ["GetAllAuditLog"]);
        assert!(AUDIT_DAL.contains("string query = \"SELECT * FROM AuditLog\";"));
    }
}

mod business_logic {
    use super::*;

    #[test]
    fn test_imports_data_access_namespace() {
        assert!(STUDENT_BLL.starts_with(
            "using System;\nusing System.Data;\nusing School.DataAccess;\n\nnamespace School.BusinessLogic\n{\n    public class clsStudent\n"
        ));
    }

    #[test]
    fn test_mode_and_properties() {
        assert!(STUDENT_BLL.contains(
            "\
        public enum enMode { AddNew = 0, Update = 1 };
        public enMode Mode { get; set; }
        public int StudentID { get; set; }
        public string Name { get; set; }
        public decimal? GPA { get; set; }
        public string Email { get; set; }
        public DateTime EnrolledOn { get; set; }
        public bool IsActive { get; set; }
"
        ));
    }

    #[test]
    fn test_new_entity_defaults() {
        assert!(STUDENT_BLL.contains(
            "\
        public clsStudent()
        {
            this.StudentID = -1;
            this.Name = string.Empty;
            this.GPA = null;
            this.Email = null;
            this.EnrolledOn = DateTime.Now;
            this.IsActive = false;

            Mode = enMode.AddNew;
        }
"
        ));
    }

    #[test]
    fn test_find_and_private_constructor() {
        assert!(STUDENT_BLL.contains(
            "private clsStudent(int StudentID, string Name, decimal? GPA, string Email, DateTime EnrolledOn, bool IsActive)"
        ));
        assert!(STUDENT_BLL.contains(
            "\
        public static clsStudent FindStudent(int StudentID)
        {
            string Name = default;
            decimal? GPA = default;
            string Email = default;
            DateTime EnrolledOn = default;
            bool IsActive = default;

            if (clsStudentData.GetStudentByID(StudentID, ref Name, ref GPA, ref Email, ref EnrolledOn, ref IsActive))
                return new clsStudent(StudentID, Name, GPA, Email, EnrolledOn, IsActive);

            return null;
        }
"
        ));
    }

    #[test]
    fn test_save_transitions_once() {
        assert!(STUDENT_BLL.contains(
            "\
        public bool Save()
        {
            if (Mode == enMode.AddNew)
            {
                if (_AddNewStudent())
                {
                    Mode = enMode.Update;

                    return true;
                }

                return false;
            }

            return _UpdateStudent();
        }
"
        ));
    }

    #[test]
    fn test_method_set_mirrors_dal() {
        assert_eq!(
            public_methods(STUDENT_BLL),
            [
                "FindStudent",
                "Save",
                "_AddNewStudent",
                "_UpdateStudent",
                "DeleteStudent",
                "IsStudentExists",
                "GetAllStudents"
            ]
        );
        assert!(COURSE_BLL.contains("this.CourseID = clsCourseData.AddNewCourse(this.Title, this.Credits, this.Fee);"));
        assert!(COURSE_BLL.contains("return (this.CourseID != -1);"));
        assert!(COURSE_BLL.contains("this.Credits = null;"));
    }

    #[test]
    fn test_read_only_tables_get_passthrough_only() {
        assert_eq!(public_methods(ENROLLMENT_BLL), ["GetAllEnrollments"]);
        assert!(ENROLLMENT_BLL.contains("return clsEnrollmentData.GetAllEnrollments();"));
        assert!(!ENROLLMENT_BLL.contains("enMode"));

        assert_eq!(public_methods(AUDIT_BLL), ["GetAllAuditLog"]);
    }
}
