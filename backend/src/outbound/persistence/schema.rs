//! Diesel table definitions mirroring `backend/migrations`.
//!
//! Keep in step with the migrations; `diesel print-schema` regenerates the
//! column lists from a live database.

diesel::table! {
    /// Field staff. `role` and `status` hold the snake_case enum names.
    users (id) {
        id -> Uuid,
        full_name -> Varchar,
        role -> Text,
        phone -> Nullable<Text>,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    localities (id) {
        id -> Uuid,
        name -> Text,
        county -> Text,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Stores; `code` is unique across all localities.
    stores (id) {
        id -> Uuid,
        code -> Text,
        name -> Text,
        address -> Nullable<Text>,
        locality_id -> Uuid,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Field trips. Members live in `assignment_members`.
    assignments (id) {
        id -> Uuid,
        kind -> Text,
        locality_id -> Uuid,
        store_id -> Nullable<Uuid>,
        team_lead_id -> Uuid,
        status -> Text,
        start_date -> Date,
        end_date -> Nullable<Date>,
        car_plate -> Nullable<Text>,
        /// Round trip.
        distance_km -> Nullable<Float8>,
        /// One way.
        travel_minutes -> Nullable<Int4>,
        departure_at -> Nullable<Timestamptz>,
        return_at -> Nullable<Timestamptz>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    assignment_members (assignment_id, user_id) {
        assignment_id -> Uuid,
        user_id -> Uuid,
    }
}

diesel::table! {
    work_logs (id) {
        id -> Uuid,
        user_id -> Uuid,
        assignment_id -> Uuid,
        work_date -> Date,
        hours -> Float8,
        description -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// GPS samples classified against the depot geofence. Unique on
    /// `(car_plate, recorded_at)`.
    vehicle_presence (id) {
        id -> Int8,
        car_plate -> Text,
        recorded_at -> Timestamptz,
        latitude -> Float8,
        longitude -> Float8,
        distance_to_depot_m -> Float8,
        at_depot -> Bool,
    }
}

diesel::joinable!(stores -> localities (locality_id));
diesel::joinable!(assignments -> localities (locality_id));
diesel::joinable!(assignments -> stores (store_id));
diesel::joinable!(assignments -> users (team_lead_id));
diesel::joinable!(assignment_members -> assignments (assignment_id));
diesel::joinable!(assignment_members -> users (user_id));
diesel::joinable!(work_logs -> assignments (assignment_id));
diesel::joinable!(work_logs -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    localities,
    stores,
    assignments,
    assignment_members,
    work_logs,
    vehicle_presence,
);
