use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Gender {
    Male => "M",
    Female => "F",
    Other => "O",
});

str_enum!(RoleName {
    CountyAdmin => "COUNTY_ADMIN",
    PublicHealthOfficer => "PUBLIC_HEALTH_OFFICER",
    MeOfficer => "ME_OFFICER",
    FacilityManager => "FACILITY_MANAGER",
    ClinicalOfficer => "CLINICAL_OFFICER",
    Nurse => "NURSE",
    LabTech => "LAB_TECH",
    Pharmacist => "PHARMACIST",
    DataClerk => "DATA_CLERK",
    Chv => "CHV",
    Chew => "CHEW",
});

str_enum!(FacilityType {
    Dispensary => "DISPENSARY",
    HealthCentre => "HEALTH_CENTRE",
    SubCountyHospital => "SUB_COUNTY_HOSPITAL",
    CountyReferral => "COUNTY_REFERRAL",
    PrivateClinic => "PRIVATE_CLINIC",
});

str_enum!(VisitType {
    Routine => "ROUTINE",
    FollowUp => "FOLLOW_UP",
    ReferralCheck => "REFERRAL_CHECK",
    Emergency => "EMERGENCY",
});

str_enum!(OutreachEventType {
    Immunization => "IMMUNIZATION",
    Screening => "SCREENING",
    Education => "EDUCATION",
    Deworming => "DEWORMING",
    Nutrition => "NUTRITION",
});

str_enum!(ScreeningType {
    Tb => "TB",
    Hiv => "HIV",
    Diabetes => "DIABETES",
    Hypertension => "HYPERTENSION",
    Malnutrition => "MALNUTRITION",
    CervicalCancer => "CERVICAL_CANCER",
});

str_enum!(ScreeningResult {
    Negative => "NEGATIVE",
    Positive => "POSITIVE",
    Inconclusive => "INCONCLUSIVE",
    Referred => "REFERRED",
});

str_enum!(ReferralUrgency {
    Routine => "ROUTINE",
    Urgent => "URGENT",
    Emergency => "EMERGENCY",
});

str_enum!(ReferralStatus {
    Pending => "PENDING",
    Accepted => "ACCEPTED",
    InTransit => "IN_TRANSIT",
    Arrived => "ARRIVED",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

str_enum!(SurveillanceSource {
    Facility => "FACILITY",
    Chv => "CHV",
    Laboratory => "LABORATORY",
    School => "SCHOOL",
});

str_enum!(DeathCategory {
    Neonatal => "NEONATAL",
    Infant => "INFANT",
    Child => "CHILD",
    Maternal => "MATERNAL",
    Adult => "ADULT",
});

str_enum!(IndicatorType {
    Input => "INPUT",
    Output => "OUTPUT",
    Outcome => "OUTCOME",
    Impact => "IMPACT",
});

str_enum!(CampaignStatus {
    Planned => "PLANNED",
    Ongoing => "ONGOING",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

str_enum!(CommodityType {
    Medicine => "MEDICINE",
    Vaccine => "VACCINE",
    Supply => "SUPPLY",
    Equipment => "EQUIPMENT",
    Reagent => "REAGENT",
});

str_enum!(TransactionType {
    In => "IN",
    Out => "OUT",
    Adjustment => "ADJUSTMENT",
    Transfer => "TRANSFER",
    Expired => "EXPIRED",
});

str_enum!(ProcurementStatus {
    Draft => "DRAFT",
    Submitted => "SUBMITTED",
    Approved => "APPROVED",
    Rejected => "REJECTED",
    Ordered => "ORDERED",
    Delivered => "DELIVERED",
});

str_enum!(PurchaseOrderStatus {
    Draft => "DRAFT",
    Sent => "SENT",
    Confirmed => "CONFIRMED",
    PartialDelivery => "PARTIAL_DELIVERY",
    Delivered => "DELIVERED",
    Cancelled => "CANCELLED",
});

str_enum!(LabOrderStatus {
    Pending => "PENDING",
    SampleCollected => "SAMPLE_COLLECTED",
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

str_enum!(Cadre {
    Doctor => "DOCTOR",
    ClinicalOfficer => "CLINICAL_OFFICER",
    Nurse => "NURSE",
    EnrolledNurse => "ENROLLED_NURSE",
    LabTech => "LAB_TECH",
    Pharmacist => "PHARMACIST",
    PharmaceuticalTech => "PHARMACEUTICAL_TECH",
    Nutritionist => "NUTRITIONIST",
    HealthRecords => "HEALTH_RECORDS",
    PublicHealthOfficer => "PUBLIC_HEALTH_OFFICER",
});

impl RoleName {
    /// Access level granted by the role; higher means more access.
    pub fn level(&self) -> i32 {
        match self {
            Self::CountyAdmin => 10,
            Self::PublicHealthOfficer => 8,
            Self::MeOfficer => 7,
            Self::FacilityManager => 6,
            Self::ClinicalOfficer | Self::Nurse => 5,
            Self::LabTech | Self::Pharmacist => 4,
            Self::DataClerk | Self::Chew => 3,
            Self::Chv => 2,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::CountyAdmin => "County level administrator",
            Self::PublicHealthOfficer => "Public health officer",
            Self::MeOfficer => "Monitoring and evaluation officer",
            Self::FacilityManager => "Health facility manager",
            Self::ClinicalOfficer => "Clinical officer",
            Self::Nurse => "Registered nurse",
            Self::LabTech => "Laboratory technician",
            Self::Pharmacist => "Pharmacist",
            Self::DataClerk => "Data entry clerk",
            Self::Chv => "Community health volunteer",
            Self::Chew => "Community health extension worker",
        }
    }

    /// Staff cadre for clinical roles; administrative roles have none.
    pub fn cadre(&self) -> Option<Cadre> {
        match self {
            Self::ClinicalOfficer => Some(Cadre::ClinicalOfficer),
            Self::Nurse => Some(Cadre::Nurse),
            Self::LabTech => Some(Cadre::LabTech),
            Self::Pharmacist => Some(Cadre::Pharmacist),
            _ => None,
        }
    }
}

impl FacilityType {
    /// Facilities that accept inbound referrals.
    pub fn is_referral_hospital(&self) -> bool {
        matches!(self, Self::CountyReferral | Self::SubCountyHospital)
    }
}
