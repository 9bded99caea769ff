// Diesel schema for the snapshot table. Only the current generation is
// described here; the legacy layout is handled with raw SQL in `migration`.
diesel::table! {
    ticket_info (id) {
        id -> BigInt,
        city -> Text,
        queue_status -> Text,
        queue_length -> Integer,
        timestamp -> Text,
        service_name -> Nullable<Text>,
        service_id -> Nullable<Integer>,
        operations_count -> Nullable<Integer>,
        enabled_operations -> Nullable<Integer>,
        created_at -> Nullable<Text>,
    }
}
