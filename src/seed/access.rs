use rusqlite::Connection;
use uuid::Uuid;

use super::context::{pick, SeedContext, SeededUser};
use super::error::SeedError;
use crate::db::{assign_role, insert_role, insert_user};
use crate::models::enums::RoleName;
use crate::models::*;

pub(crate) const STAFF_FIRST_NAMES: [&str; 10] = [
    "Abdi", "Fatuma", "Hassan", "Halima", "Omar", "Amina", "Yusuf", "Zamzam", "Ali", "Maryam",
];
pub(crate) const STAFF_LAST_NAMES: [&str; 8] =
    ["Ali", "Ibrahim", "Mohamed", "Hassan", "Abdi", "Hussein", "Ahmed", "Omar"];

const FACILITY_MANAGERS: [(&str, &str); 6] = [
    ("Abdi", "Ali"),
    ("Halima", "Hussein"),
    ("Omar", "Abdi"),
    ("Amina", "Mohamed"),
    ("Yusuf", "Ibrahim"),
    ("Zamzam", "Hassan"),
];

/// Clinical and support staff accounts per role.
const STAFF_ROLES: [(RoleName, usize); 5] = [
    (RoleName::ClinicalOfficer, 15),
    (RoleName::Nurse, 25),
    (RoleName::LabTech, 10),
    (RoleName::Pharmacist, 8),
    (RoleName::DataClerk, 12),
];

pub fn seed_roles(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    for &name in RoleName::ALL {
        let role = Role {
            id: ctx.new_id(),
            name,
            description: Some(name.description().into()),
            level: name.level(),
        };
        insert_role(conn, &role)?;
        ctx.roles.insert(name, role);
    }
    tracing::info!(rows = ctx.roles.len(), "Seeded roles");
    Ok(())
}

/// Everything needed to create one account besides the shared defaults.
pub(crate) struct NewUser<'a> {
    pub email: String,
    pub phone: String,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub national_id: String,
    pub subcounty_id: Option<Uuid>,
    pub role: RoleName,
}

/// Insert a user, grant its role and remember it in the context.
pub(crate) fn create_user(
    conn: &Connection,
    ctx: &mut SeedContext,
    new: NewUser<'_>,
) -> Result<Uuid, SeedError> {
    let county_id = ctx.county()?.id;
    let role_id = ctx.role(new.role)?.id;
    let superuser = new.role == RoleName::CountyAdmin;
    let user = User {
        id: ctx.new_id(),
        email: new.email,
        phone: new.phone,
        first_name: new.first_name.into(),
        last_name: new.last_name.into(),
        national_id: Some(new.national_id),
        county_id: Some(county_id),
        subcounty_id: new.subcounty_id,
        password_hash: ctx.password_hash.clone(),
        is_active: true,
        is_staff: superuser,
        is_superuser: superuser,
        last_login: None,
    };
    insert_user(conn, &user)?;
    assign_role(conn, &user.id, &role_id)?;
    let id = user.id;
    ctx.users.push(SeededUser {
        user,
        role: new.role,
    });
    Ok(id)
}

/// County leadership, one manager per sub-county, then clinical staff.
/// CHV accounts are created alongside their CHV records.
pub fn seed_users(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let first_subcounty = ctx
        .subcounties
        .first()
        .map(|s| s.id)
        .ok_or(SeedError::EmptyCollection { what: "subcounties" })?;

    let leadership = [
        ("admin", "+254720000001", "Ahmed", "Hassan", "12345678", RoleName::CountyAdmin, None),
        (
            "pho",
            "+254720000002",
            "Fatuma",
            "Ibrahim",
            "23456789",
            RoleName::PublicHealthOfficer,
            Some(first_subcounty),
        ),
        (
            "me",
            "+254720000003",
            "Hassan",
            "Mohamed",
            "34567890",
            RoleName::MeOfficer,
            Some(first_subcounty),
        ),
    ];
    for (local, phone, first_name, last_name, national_id, role, subcounty_id) in leadership {
        create_user(
            conn,
            ctx,
            NewUser {
                email: format!("{local}@wajir.health.go.ke"),
                phone: phone.into(),
                first_name,
                last_name,
                national_id: national_id.into(),
                subcounty_id,
                role,
            },
        )?;
    }

    for (i, (first_name, last_name)) in FACILITY_MANAGERS.into_iter().enumerate() {
        let subcounty_id = ctx.subcounties.get(i).map(|s| s.id);
        create_user(
            conn,
            ctx,
            NewUser {
                email: format!(
                    "{}.{}@wajir.health.go.ke",
                    first_name.to_lowercase(),
                    last_name.to_lowercase()
                ),
                phone: format!("+25472000001{}", i + 4),
                first_name,
                last_name,
                national_id: (45_678_900 + i).to_string(),
                subcounty_id,
                role: RoleName::FacilityManager,
            },
        )?;
    }

    let mut staff_counter = 100;
    for (role, count) in STAFF_ROLES {
        for _ in 0..count {
            let first_name = *pick(&mut ctx.rng, &STAFF_FIRST_NAMES, "staff first names")?;
            let last_name = *pick(&mut ctx.rng, &STAFF_LAST_NAMES, "staff last names")?;
            let subcounty_id = pick(&mut ctx.rng, &ctx.subcounties, "subcounties")?.id;
            create_user(
                conn,
                ctx,
                NewUser {
                    email: format!(
                        "{}{staff_counter}@wajir.health.go.ke",
                        role.as_str().to_lowercase()
                    ),
                    phone: format!("+254720{staff_counter:06}"),
                    first_name,
                    last_name,
                    national_id: (56_789_000 + staff_counter).to_string(),
                    subcounty_id: Some(subcounty_id),
                    role,
                },
            )?;
            staff_counter += 1;
        }
    }

    tracing::info!(rows = ctx.users.len(), "Seeded users");
    Ok(())
}
