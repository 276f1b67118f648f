diesel::table! {
    appointments (id) {
        id -> Text,
        client_id -> Text,
        counselor_id -> Text,
        day -> Text,
        time -> Text,
        date -> Date,
        status -> Text,
        student_id -> Text,
        telephone -> Text,
        notes -> Nullable<Text>,
        google_event_id -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    case_codes (code) {
        code -> Text,
        issued_by -> Text,
        used_by -> Nullable<Text>,
        used_at -> Nullable<Timestamp>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    case_notes (id) {
        id -> Text,
        appointment_id -> Text,
        counselor_id -> Text,
        client_id -> Text,
        content -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    onboarding_flags (user_id, flag) {
        user_id -> Text,
        flag -> Text,
        value -> Bool,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    time_blocks (counselor_id, day, time) {
        counselor_id -> Text,
        day -> Text,
        time -> Text,
        available -> Bool,
        booked_by -> Nullable<Text>,
    }
}

diesel::table! {
    user_logins (token) {
        token -> Text,
        user_id -> Text,
        login_time -> Timestamp,
    }
}

diesel::table! {
    users (id) {
        id -> Text,
        password -> Text,
        name -> Text,
        role -> Text,
        student_id -> Nullable<Text>,
        telephone -> Nullable<Text>,
        is_banned -> Bool,
        created_at -> Timestamp,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    appointments,
    case_codes,
    case_notes,
    onboarding_flags,
    time_blocks,
    user_logins,
    users,
);
