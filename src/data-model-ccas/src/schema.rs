// Mirrors `db::CREATE_SCHEMA`.

diesel::table! {
    ccas_city (id) {
        id -> Integer,
        country -> Text,
        city -> Text,
        education_level -> Text,
        job_status -> Nullable<Text>,
        ccas_status -> Nullable<Text>,
        ccas_status_source -> Nullable<Text>,
        participating_institutions -> Nullable<Text>,
        participating_institutions_source -> Nullable<Text>,
        preference_list_length -> Nullable<Text>,
        preference_list_length_source -> Nullable<Text>,
        priority_criteria -> Nullable<Text>,
        priority_criteria_source -> Nullable<Text>,
        assignment_mechanism -> Nullable<Text>,
        assignment_mechanism_source -> Nullable<Text>,
        adoption_year -> Nullable<Text>,
        adoption_year_source -> Nullable<Text>,
        reform_year -> Nullable<Text>,
        reform_year_source -> Nullable<Text>,
        notes -> Nullable<Text>,
    }
}
