use rand::Rng;
use rusqlite::Connection;

use super::context::SeedContext;
use super::error::SeedError;
use crate::db::{insert_county, insert_subcounty, insert_ward};
use crate::models::*;

/// (name, code, population, wards)
const SUBCOUNTIES: [(&str, &str, i64, [&str; 4]); 6] = [
    ("Wajir North", "WJR-N", 89_456, ["Bute", "Danyere", "Gurar", "Batalu"]),
    ("Wajir East", "WJR-E", 145_234, ["Wagberi", "Township", "Barwaqo", "Khorof Harar"]),
    (
        "Wajir West",
        "WJR-W",
        123_567,
        ["Hadado Athibohol", "Ganyure Wagalla", "Iftin", "Ademasajide"],
    ),
    ("Wajir South", "WJR-S", 178_934, ["Habasweyn", "Diif", "Benane", "Lagboghol"]),
    ("Tarbaj", "WJR-TB", 112_456, ["Tarbaj", "Wargadud", "Elben", "Sarman"]),
    ("Eldas", "WJR-EL", 131_616, ["Della", "Lakoley", "Elnur", "Goreale"]),
];

/// County, sub-counties and wards. Ward codes carry a county-wide counter.
pub fn seed_geography(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let county = County {
        id: ctx.new_id(),
        name: "Wajir".into(),
        code: "WJR".into(),
        population: Some(781_263),
        contact_person: Some("Dr. Ahmed Hassan".into()),
        phone: Some("+254720123456".into()),
        email: Some("health@wajir.go.ke".into()),
    };
    insert_county(conn, &county)?;

    let mut ward_counter = 0;
    for (name, code, population, ward_names) in SUBCOUNTIES {
        let subcounty = SubCounty {
            id: ctx.new_id(),
            county_id: county.id,
            name: name.into(),
            code: code.into(),
            population: Some(population),
        };
        insert_subcounty(conn, &subcounty)?;

        for ward_name in ward_names {
            ward_counter += 1;
            let ward = Ward {
                id: ctx.new_id(),
                subcounty_id: subcounty.id,
                name: ward_name.into(),
                code: format!("{code}-W{ward_counter:02}"),
                population: Some(ctx.rng.gen_range(15_000..=35_000)),
            };
            insert_ward(conn, &ward)?;
            ctx.wards.push(ward);
        }
        ctx.subcounties.push(subcounty);
    }

    tracing::info!(
        subcounties = ctx.subcounties.len(),
        wards = ctx.wards.len(),
        "Seeded geography"
    );
    ctx.county = Some(county);
    Ok(())
}
