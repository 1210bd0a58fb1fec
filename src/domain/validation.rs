use validator::ValidationError;

use crate::entities::reservation::{MAX_PASSENGERS, MIN_PASSENGERS, PAYMENT_METHODS, VEHICLE_CATEGORIES};

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// The forms only promise an `@`; deliverability is the mail provider's problem.
pub fn contains_at_sign(email: &str) -> Result<(), ValidationError> {
    if email.contains('@') {
        Ok(())
    } else {
        Err(invalid("email", "Zadajte platný email"))
    }
}

pub fn contact_consent_given(consent: &bool) -> Result<(), ValidationError> {
    if *consent {
        Ok(())
    } else {
        Err(invalid("gdpr_consent", "Je potrebné súhlasiť so spracovaním údajov"))
    }
}

pub fn reservation_consent_given(consent: &bool) -> Result<(), ValidationError> {
    if *consent {
        Ok(())
    } else {
        Err(invalid("gdpr_consent", "Súhlas so spracovaním osobných údajov je povinný."))
    }
}

pub fn valid_passenger_count(raw: &str) -> Result<(), ValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(n) if (MIN_PASSENGERS..=MAX_PASSENGERS).contains(&n) => Ok(()),
        _ => Err(invalid("passengers", "Počet pasažierov musí byť číslo od 1 do 20")),
    }
}

pub fn known_vehicle_category(category: &str) -> Result<(), ValidationError> {
    if VEHICLE_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(invalid("vehicle_category", "Vyberte platnú kategóriu vozidla"))
    }
}

pub fn known_payment_method(method: &str) -> Result<(), ValidationError> {
    if PAYMENT_METHODS.contains(&method) {
        Ok(())
    } else {
        Err(invalid("payment_method", "Vyberte platný spôsob platby"))
    }
}
