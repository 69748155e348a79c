use crate::classify::field_type::FieldType;
use crate::classify::registry::PatternSpec;
use crate::survey::model::InputKind;

/// Built-in rule set. Vocabulary covers English and German surveys.
pub fn default_patterns() -> Vec<PatternSpec> {
    use InputKind::*;

    vec![
        // scale widgets; text rules never claim these kinds
        PatternSpec::new("analog-scale", 100, FieldType::AnalogScale, 100).kinds(&[Vas]),
        PatternSpec::new("numeric-rating", 100, FieldType::NumericRating, 100).kinds(&[Nrs]),
        PatternSpec::new("birth-date", 90, FieldType::BirthDate, 95)
            .text(r"date of birth|birth\s?date|birthday|geburtsdatum|geboren")
            .kinds(&[Date, Text]),
        PatternSpec::new("email", 85, FieldType::Email, 95)
            .text(r"\be-?mail\b")
            .kinds(&[Email]),
        PatternSpec::new("date", 80, FieldType::Date, 85)
            .text(r"\b(date|datum|when did|seit wann|wann)\b")
            .kinds(&[Date]),
        PatternSpec::new("weight", 80, FieldType::Weight, 90)
            .text(r"\b(weight|weigh|gewicht|körpergewicht|kg|kilogramm?|kilograms?)\b")
            .kinds(&[Number, AutocompleteDropdown]),
        PatternSpec::new("height", 80, FieldType::Height, 90)
            .text(r"\b(height|how tall|körpergröße|körpergrösse|größe|grösse|cm)\b")
            .kinds(&[Number, AutocompleteDropdown]),
        PatternSpec::new("age", 75, FieldType::Age, 85)
            .text(r"\b(age|how old|alter|wie alt)\b")
            .kinds(&[Number]),
        PatternSpec::new("phone", 70, FieldType::Phone, 85)
            .text(r"\b(phone|telephone|mobile|telefon|telefonnummer|handy)\b")
            .kinds(&[Text, Number]),
        PatternSpec::new("postal-code", 70, FieldType::PostalCode, 85)
            .text(r"\b(zip|postal code|postcode|plz|postleitzahl)\b")
            .kinds(&[Text, Number]),
        PatternSpec::new("yes-no", 65, FieldType::YesNo, 90)
            .kinds(&[Radio, Dropdown])
            .context(r"^(yes|no|ja|nein)$"),
        PatternSpec::new("name", 60, FieldType::Name, 80)
            .text(r"\b(first name|last name|surname|full name|your name|vorname|nachname)\b")
            .kinds(&[Text]),
        PatternSpec::new("long-text", 40, FieldType::LongText, 70).kinds(&[Textarea]),
        PatternSpec::new("number", 30, FieldType::Number, 70).kinds(&[Number]),
    ]
}
