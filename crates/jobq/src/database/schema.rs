/*
 *  Copyright 2025-2026 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Diesel table definitions matching the embedded migrations.

diesel::table! {
    jobs (id) {
        id -> Text,
        command -> Text,
        state -> Text,
        attempts -> Integer,
        max_retries -> Integer,
        run_at -> Timestamp,
        created_at -> Timestamp,
        updated_at -> Timestamp,
        priority -> Integer,
        output -> Nullable<Text>,
    }
}

diesel::table! {
    job_metrics (id) {
        id -> Integer,
        job_id -> Text,
        final_state -> Text,
        duration_ms -> BigInt,
        logged_at -> Timestamp,
    }
}

diesel::allow_tables_to_appear_in_same_query!(jobs, job_metrics);
