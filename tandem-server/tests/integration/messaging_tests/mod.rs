mod test_payload_passthrough;
mod test_routing_excludes_sender;
