//! Canned EC2 response bodies, shaped like the 2016-11-15 API.

const XMLNS: &str = "http://ec2.amazonaws.com/doc/2016-11-15/";

fn response(action: &str, content: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <{action}Response xmlns=\"{xmlns}\">\n\
         <requestId>59dbff89-35bd-4eac-99ed-be587EXAMPLE</requestId>\n\
         {content}\n\
         </{action}Response>",
        action = action,
        xmlns = XMLNS,
        content = content
    )
}

pub fn spot_request_item(id: &str, state: &str, instance_id: Option<&str>) -> String {
    let (code, message) = match state {
        "open" => (
            "pending-evaluation",
            "Your Spot request has been submitted for review, and is pending evaluation.",
        ),
        "active" => ("fulfilled", "Your Spot request is fulfilled."),
        _ => (
            "canceled-before-fulfillment",
            "Your Spot request was canceled before it was fulfilled.",
        ),
    };
    let instance = instance_id
        .map(|i| format!("<instanceId>{}</instanceId>", i))
        .unwrap_or_default();
    format!(
        "<item>\
         <spotInstanceRequestId>{id}</spotInstanceRequestId>\
         <spotPrice>0.050000</spotPrice>\
         <type>one-time</type>\
         <state>{state}</state>\
         <status><code>{code}</code><updateTime>2014-06-01T00:00:00.000Z</updateTime><message>{message}</message></status>\
         <launchSpecification>\
         <imageId>ami-123</imageId>\
         <keyName>ccg-syd-staging</keyName>\
         <groupSet>\
         <item><groupId>sg-1</groupId><groupName>default</groupName></item>\
         <item><groupId>sg-2</groupId><groupName>ssh</groupName></item>\
         </groupSet>\
         <instanceType>m1.small</instanceType>\
         <blockDeviceMapping/>\
         <monitoring><enabled>false</enabled></monitoring>\
         <ebsOptimized>false</ebsOptimized>\
         </launchSpecification>\
         {instance}\
         <createTime>2014-06-01T00:00:00.000Z</createTime>\
         <productDescription>Linux/UNIX</productDescription>\
         </item>",
        id = id,
        state = state,
        code = code,
        message = message,
        instance = instance
    )
}

fn spot_request_set(items: &[String]) -> String {
    format!(
        "<spotInstanceRequestSet>{}</spotInstanceRequestSet>",
        items.concat()
    )
}

pub fn request_spot_instances_response(items: &[String]) -> String {
    response("RequestSpotInstances", &spot_request_set(items))
}

pub fn describe_spot_instance_requests_response(items: &[String]) -> String {
    response("DescribeSpotInstanceRequests", &spot_request_set(items))
}

pub fn cancel_spot_instance_requests_response(id: &str, state: &str) -> String {
    response(
        "CancelSpotInstanceRequests",
        &format!(
            "<spotInstanceRequestSet><item>\
             <spotInstanceRequestId>{}</spotInstanceRequestId>\
             <state>{}</state>\
             </item></spotInstanceRequestSet>",
            id, state
        ),
    )
}

pub fn instance_item(id: &str, state: &str, name: Option<&str>) -> String {
    let tags = name
        .map(|n| {
            format!(
                "<tagSet><item><key>Name</key><value>{}</value></item></tagSet>",
                n
            )
        })
        .unwrap_or_default();
    format!(
        "<item>\
         <instanceId>{id}</instanceId>\
         <imageId>ami-123</imageId>\
         <instanceState><code>0</code><name>{state}</name></instanceState>\
         <privateDnsName/>\
         <dnsName/>\
         <keyName>ccg-syd-staging</keyName>\
         <instanceType>m1.small</instanceType>\
         <launchTime>2014-06-01T00:00:00.000Z</launchTime>\
         <placement><availabilityZone>us-east-1a</availabilityZone></placement>\
         <privateIpAddress>10.0.0.12</privateIpAddress>\
         {tags}\
         </item>",
        id = id,
        state = state,
        tags = tags
    )
}

pub fn run_instances_response(items: &[String]) -> String {
    response(
        "RunInstances",
        &format!(
            "<reservationId>r-1</reservationId>\
             <ownerId>123456789012</ownerId>\
             <instancesSet>{}</instancesSet>",
            items.concat()
        ),
    )
}

pub fn describe_instances_response(reservations: &[Vec<String>]) -> String {
    let reservations: Vec<String> = reservations
        .iter()
        .enumerate()
        .map(|(i, items)| {
            format!(
                "<item><reservationId>r-{}</reservationId><instancesSet>{}</instancesSet></item>",
                i + 1,
                items.concat()
            )
        })
        .collect();
    response(
        "DescribeInstances",
        &format!("<reservationSet>{}</reservationSet>", reservations.concat()),
    )
}

pub fn terminate_instances_response(id: &str) -> String {
    response(
        "TerminateInstances",
        &format!(
            "<instancesSet><item>\
             <instanceId>{}</instanceId>\
             <currentState><code>32</code><name>shutting-down</name></currentState>\
             <previousState><code>16</code><name>running</name></previousState>\
             </item></instancesSet>",
            id
        ),
    )
}

pub fn create_tags_response(result: bool) -> String {
    response("CreateTags", &format!("<return>{}</return>", result))
}

pub fn error_response(code: &str, message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Response><Errors><Error><Code>{}</Code><Message>{}</Message></Error></Errors>\
         <RequestID>ea966190-f9aa-478e-9ede-example</RequestID></Response>",
        code, message
    )
}
