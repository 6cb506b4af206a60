//! Input checks that run before any domain object is built.
//!
//! Every rule is evaluated and the messages are joined with `"; "`, so a
//! caller fixing a form sees all problems at once.

use common::Failure;
use domain::{Money, RoleName, TierDetails};
use domain::tier::{
    MAX_DESCRIPTION_LENGTH, MAX_DURATION_IN_DAYS, MAX_IMAGE_URL_LENGTH, MAX_NAME_LENGTH,
};

/// Raw tier fields as received from a client.
#[derive(Debug, Clone, PartialEq)]
pub struct TierInput {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub price: i64,
    pub currency: String,
    pub duration_in_days: i64,
}

#[derive(Debug, Default)]
struct Violations(Vec<&'static str>);

impl Violations {
    fn check(&mut self, ok: bool, message: &'static str) {
        if !ok {
            self.0.push(message);
        }
    }

    fn into_result(self) -> Result<(), Failure> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(Failure::invalid(self.0.join("; ")))
        }
    }
}

/// Checks the tier fields and builds the domain details.
pub fn validate_tier(input: &TierInput) -> Result<TierDetails, Failure> {
    let mut violations = Violations::default();

    let name = input.name.trim();
    violations.check(!name.is_empty(), "Name is required");
    violations.check(
        name.chars().count() <= MAX_NAME_LENGTH,
        "Name cannot exceed 100 characters",
    );

    let description = input.description.trim();
    violations.check(!description.is_empty(), "Description is required");
    violations.check(
        description.chars().count() <= MAX_DESCRIPTION_LENGTH,
        "Description cannot exceed 500 characters",
    );

    violations.check(input.price >= 0, "Price must be greater than or equal to 0");

    let currency = input.currency.trim();
    if currency.is_empty() {
        violations.check(false, "Currency is required");
    } else {
        violations.check(
            currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()),
            "Currency must be a 3-letter ISO code",
        );
    }

    violations.check(input.duration_in_days > 0, "Duration must be greater than 0 days");
    violations.check(
        input.duration_in_days <= i64::from(MAX_DURATION_IN_DAYS),
        "Duration cannot exceed 36500 days",
    );

    violations.check(
        input
            .image_url
            .as_deref()
            .is_none_or(|url| url.trim().chars().count() <= MAX_IMAGE_URL_LENGTH),
        "Image URL cannot exceed 500 characters",
    );

    violations.into_result()?;

    let duration_in_days = u32::try_from(input.duration_in_days)
        .map_err(|_| Failure::invalid("Duration must be greater than 0 days"))?;

    Ok(TierDetails {
        name: name.to_string(),
        description: description.to_string(),
        image_url: input.image_url.clone(),
        price: Money::new(input.price, currency)?,
        duration_in_days,
    })
}

/// Parses a role name, accepting any casing.
pub fn validate_target_role(role: &str) -> Result<RoleName, Failure> {
    if role.trim().is_empty() {
        return Err(Failure::invalid("Target role is required"));
    }
    role.parse()
        .map_err(|_| Failure::invalid("Target role must be Student, Teacher, or Admin"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> TierInput {
        TierInput {
            name: "Pro".to_string(),
            description: "Everything unlocked".to_string(),
            image_url: None,
            price: 199_000,
            currency: "vnd".to_string(),
            duration_in_days: 30,
        }
    }

    #[test]
    fn valid_input_builds_details() {
        let details = validate_tier(&input()).unwrap();
        assert_eq!(details.name, "Pro");
        assert_eq!(details.price.currency().as_str(), "VND");
        assert_eq!(details.duration_in_days, 30);
    }

    #[test]
    fn single_violation_message() {
        let mut bad = input();
        bad.name = "   ".to_string();
        let failure = validate_tier(&bad).unwrap_err();
        assert_eq!(failure.message(), "Name is required");
    }

    #[test]
    fn all_violations_are_reported() {
        let bad = TierInput {
            name: "x".repeat(101),
            description: String::new(),
            image_url: Some("u".repeat(501)),
            price: -1,
            currency: "DONG".to_string(),
            duration_in_days: 0,
        };

        let failure = validate_tier(&bad).unwrap_err();
        assert_eq!(
            failure.message(),
            "Name cannot exceed 100 characters; Description is required; \
             Price must be greater than or equal to 0; Currency must be a 3-letter ISO code; \
             Duration must be greater than 0 days; Image URL cannot exceed 500 characters"
        );
    }

    #[test]
    fn duration_is_capped() {
        let mut bad = input();
        bad.duration_in_days = 200_000_000;
        assert_eq!(
            validate_tier(&bad).unwrap_err().message(),
            "Duration cannot exceed 36500 days"
        );

        let mut longest = input();
        longest.duration_in_days = 36_500;
        assert_eq!(validate_tier(&longest).unwrap().duration_in_days, 36_500);
    }

    #[test]
    fn missing_currency() {
        let mut bad = input();
        bad.currency = " ".to_string();
        assert_eq!(validate_tier(&bad).unwrap_err().message(), "Currency is required");
    }

    #[test]
    fn target_role() {
        assert_eq!(validate_target_role("teacher").unwrap(), RoleName::Teacher);
        assert_eq!(
            validate_target_role("Guest").unwrap_err().message(),
            "Target role must be Student, Teacher, or Admin"
        );
        assert_eq!(
            validate_target_role("").unwrap_err().message(),
            "Target role is required"
        );
    }
}
