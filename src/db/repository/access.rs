use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{enum_col, opt_id, opt_uuid_col, uuid_col};
use crate::db::DatabaseError;
use crate::models::enums::RoleName;
use crate::models::*;

const USER_COLUMNS: &str = "id, email, phone, first_name, last_name, national_id, county_id,
    subcounty_id, password_hash, is_active, is_staff, is_superuser, last_login";

pub fn insert_role(conn: &Connection, role: &Role) -> Result<(), DatabaseError> {
    role.validate()?;
    conn.execute(
        "INSERT INTO roles (id, name, description, level) VALUES (?1, ?2, ?3, ?4)",
        params![
            role.id.to_string(),
            role.name.as_str(),
            role.description,
            role.level,
        ],
    )?;
    Ok(())
}

pub fn get_all_roles(conn: &Connection) -> Result<Vec<Role>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT id, name, description, level FROM roles ORDER BY level DESC, name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Role {
            id: uuid_col(row, 0)?,
            name: enum_col(row, 1)?,
            description: row.get(2)?,
            level: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    user.validate()?;
    conn.execute(
        &format!("INSERT INTO users ({USER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"),
        params![
            user.id.to_string(),
            user.email,
            user.phone,
            user.first_name,
            user.last_name,
            user.national_id,
            opt_id(user.county_id),
            opt_id(user.subcounty_id),
            user.password_hash,
            user.is_active,
            user.is_staff,
            user.is_superuser,
            user.last_login,
        ],
    )?;
    Ok(())
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_col(row, 0)?,
        email: row.get(1)?,
        phone: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        national_id: row.get(5)?,
        county_id: opt_uuid_col(row, 6)?,
        subcounty_id: opt_uuid_col(row, 7)?,
        password_hash: row.get(8)?,
        is_active: row.get(9)?,
        is_staff: row.get(10)?,
        is_superuser: row.get(11)?,
        last_login: row.get(12)?,
    })
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1 COLLATE NOCASE"),
            [email],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

/// Grant a role; granting an already-held role is a no-op.
pub fn assign_role(conn: &Connection, user_id: &Uuid, role_id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?1, ?2)",
        params![user_id.to_string(), role_id.to_string()],
    )?;
    Ok(())
}

pub fn get_user_roles(conn: &Connection, user_id: &Uuid) -> Result<Vec<RoleName>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT r.name FROM roles r
         JOIN user_roles ur ON ur.role_id = r.id
         WHERE ur.user_id = ?1 ORDER BY r.level DESC",
    )?;
    let rows = stmt.query_map([user_id.to_string()], |row| enum_col(row, 0))?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn get_users_with_role(conn: &Connection, role: RoleName) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users u
         JOIN user_roles ur ON ur.user_id = u.id
         JOIN roles r ON r.id = ur.role_id
         WHERE r.name = ?1 ORDER BY u.email",
        USER_COLUMNS
            .split(',')
            .map(|c| format!("u.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ")
    ))?;
    let rows = stmt.query_map([role.as_str()], user_from_row)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Scope a user to a county or sub-county after creation.
pub fn set_user_jurisdiction(
    conn: &Connection,
    user_id: &Uuid,
    county_id: Option<Uuid>,
    subcounty_id: Option<Uuid>,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE users SET county_id = ?2, subcounty_id = ?3 WHERE id = ?1",
        params![user_id.to_string(), opt_id(county_id), opt_id(subcounty_id)],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: user_id.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::{open_memory_database, ConstraintKind};

    fn role(conn: &Connection, name: RoleName) -> Uuid {
        let r = Role {
            id: Uuid::new_v4(),
            name,
            description: Some(name.description().into()),
            level: name.level(),
        };
        insert_role(conn, &r).unwrap();
        r.id
    }

    #[test]
    fn user_email_and_phone_unique() {
        let conn = open_memory_database().unwrap();
        fixtures::user(&conn, 1);
        let mut dup = User {
            id: Uuid::new_v4(),
            email: "user1@wajir.health.go.ke".into(),
            phone: "+254799999999".into(),
            first_name: "Omar".into(),
            last_name: "Abdi".into(),
            national_id: None,
            county_id: None,
            subcounty_id: None,
            password_hash: "x".into(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
        };
        let err = insert_user(&conn, &dup).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));

        dup.email = "other@wajir.health.go.ke".into();
        dup.phone = "+254720000001".into();
        let err = insert_user(&conn, &dup).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));
    }

    #[test]
    fn invalid_phone_rejected_before_insert() {
        let conn = open_memory_database().unwrap();
        let user = User {
            id: Uuid::new_v4(),
            email: "a@wajir.health.go.ke".into(),
            phone: "0720123456".into(),
            first_name: "Omar".into(),
            last_name: "Abdi".into(),
            national_id: None,
            county_id: None,
            subcounty_id: None,
            password_hash: "x".into(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
        };
        assert!(matches!(
            insert_user(&conn, &user),
            Err(DatabaseError::Validation(ValidationError::Phone { .. }))
        ));
    }

    #[test]
    fn roles_assigned_once() {
        let conn = open_memory_database().unwrap();
        let user = fixtures::user(&conn, 1);
        let nurse = role(&conn, RoleName::Nurse);
        let clerk = role(&conn, RoleName::DataClerk);
        assign_role(&conn, &user, &nurse).unwrap();
        assign_role(&conn, &user, &nurse).unwrap();
        assign_role(&conn, &user, &clerk).unwrap();
        assert_eq!(
            get_user_roles(&conn, &user).unwrap(),
            vec![RoleName::Nurse, RoleName::DataClerk]
        );
        let nurses = get_users_with_role(&conn, RoleName::Nurse).unwrap();
        assert_eq!(nurses.len(), 1);
        assert_eq!(nurses[0].id, user);
    }

    #[test]
    fn role_name_unique() {
        let conn = open_memory_database().unwrap();
        role(&conn, RoleName::Chv);
        let dup = Role {
            id: Uuid::new_v4(),
            name: RoleName::Chv,
            description: None,
            level: 2,
        };
        assert!(insert_role(&conn, &dup).is_err());
        assert_eq!(get_all_roles(&conn).unwrap().len(), 1);
    }

    #[test]
    fn email_lookup_ignores_case() {
        let conn = open_memory_database().unwrap();
        let id = fixtures::user(&conn, 7);
        let found = get_user_by_email(&conn, "USER7@wajir.health.go.ke").unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.full_name(), "Abdi Ali");
    }
}
